use crate::error::{HyperzipError, Result};

/// Size ceiling for one run. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Budget {
    pub max_size_kb: f64,
}

impl Budget {
    pub fn new(max_size_kb: f64) -> Result<Self> {
        if !max_size_kb.is_finite() || max_size_kb <= 0.0 {
            return Err(HyperzipError::InvalidBudget(max_size_kb));
        }
        Ok(Self { max_size_kb })
    }

    pub fn fits(&self, size_kb: f64) -> bool {
        size_kb <= self.max_size_kb
    }
}

/// The two compression knobs the fit search adjusts: an ordinal lossless
/// level (PNG optimizer intensity) and an ordinal lossy quality (JPEG-style),
/// each bounded by its initial and minimum value.
///
/// The lossy knob always moves first, in both directions. All transitions go
/// through [`increase`](Self::increase) and [`decrease`](Self::decrease), so
/// a knob never leaves its `[min, initial]` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityState {
    pub lossless_level: u8,
    pub lossy_quality: u8,
    initial_lossless_level: u8,
    initial_lossy_quality: u8,
    min_lossless_level: u8,
    min_lossy_quality: u8,
    lossy_step: u8,
}

impl QualityState {
    pub fn new(
        initial_lossless_level: u8,
        min_lossless_level: u8,
        initial_lossy_quality: u8,
        min_lossy_quality: u8,
        lossy_step: u8,
    ) -> Result<Self> {
        if min_lossless_level > initial_lossless_level {
            return Err(HyperzipError::InvalidQuality(format!(
                "min lossless level {} exceeds initial {}",
                min_lossless_level, initial_lossless_level
            )));
        }
        if min_lossy_quality > initial_lossy_quality {
            return Err(HyperzipError::InvalidQuality(format!(
                "min lossy quality {} exceeds initial {}",
                min_lossy_quality, initial_lossy_quality
            )));
        }
        if lossy_step == 0 {
            return Err(HyperzipError::InvalidQuality(
                "lossy quality step must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            lossless_level: initial_lossless_level,
            lossy_quality: initial_lossy_quality,
            initial_lossless_level,
            initial_lossy_quality,
            min_lossless_level,
            min_lossy_quality,
            lossy_step,
        })
    }

    pub fn initial_lossless_level(&self) -> u8 {
        self.initial_lossless_level
    }

    pub fn initial_lossy_quality(&self) -> u8 {
        self.initial_lossy_quality
    }

    pub fn min_lossless_level(&self) -> u8 {
        self.min_lossless_level
    }

    pub fn min_lossy_quality(&self) -> u8 {
        self.min_lossy_quality
    }

    pub fn lossy_step(&self) -> u8 {
        self.lossy_step
    }

    pub fn at_minimum(&self) -> bool {
        self.lossless_level <= self.min_lossless_level
            && self.lossy_quality <= self.min_lossy_quality
    }

    pub fn at_initial(&self) -> bool {
        self.lossless_level >= self.initial_lossless_level
            && self.lossy_quality >= self.initial_lossy_quality
    }

    /// Raises quality one step for the optimal-search phase: lossy quality
    /// first (by the base step, clamped to its initial value), then the
    /// lossless level by 1. Returns false when already at initial on both
    /// knobs.
    pub fn increase(&mut self) -> bool {
        if self.lossy_quality < self.initial_lossy_quality {
            self.lossy_quality = self
                .lossy_quality
                .saturating_add(self.lossy_step)
                .min(self.initial_lossy_quality);
            return true;
        }
        if self.lossless_level < self.initial_lossless_level {
            self.lossless_level += 1;
            return true;
        }
        false
    }

    /// Lowers quality for the next shrink attempt. The lossy knob moves first
    /// with a step proportional to the overshoot; once it sits at its
    /// minimum, the lossless level drops by 1. Returns false when no further
    /// reduction is possible.
    pub fn decrease(&mut self, size_kb: f64, budget: &Budget) -> bool {
        if self.lossy_quality > self.min_lossy_quality {
            let step = self.lossy_reduction_step(size_kb, budget);
            let proposed = self
                .lossy_quality
                .saturating_sub(step)
                .max(self.min_lossy_quality);
            if proposed < self.lossy_quality {
                self.lossy_quality = proposed;
                return true;
            }
        }
        if self.lossless_level > self.min_lossless_level {
            self.lossless_level -= 1;
            return true;
        }
        false
    }

    /// Estimates how many lossy quality points to drop, from the overshoot
    /// fraction scaled across the knob's full range. Grows 1.5x aggressive
    /// past 20% overshoot, rounds up to a multiple of the base step, and
    /// never goes below the base step.
    fn lossy_reduction_step(&self, size_kb: f64, budget: &Budget) -> u8 {
        let base = f64::from(self.lossy_step);
        let overshoot_kb = size_kb - budget.max_size_kb;
        let factor = if overshoot_kb > budget.max_size_kb * 0.2 {
            1.5
        } else {
            1.0
        };
        let estimate = if size_kb > 0.0 {
            (overshoot_kb / size_kb)
                * f64::from(self.initial_lossy_quality - self.min_lossy_quality)
                * factor
        } else {
            0.0
        };
        let rounded = (estimate / base).ceil() * base;
        rounded.max(base).min(f64::from(u8::MAX)) as u8
    }
}
