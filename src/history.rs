use crate::quality::QualityState;
use crate::search::SearchStatus;

/// One loop iteration's measurement. Immutable once recorded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttemptRecord {
    pub attempt: u32,
    pub size_kb: f64,
    pub quality: QualityState,
    pub status: SearchStatus,
}

/// Bookkeeping for the search loop: the immediately preceding attempt (for
/// the plateau check) and the best feasible result seen so far (for the
/// optimal-search revert).
#[derive(Debug, Default)]
pub struct AttemptHistory {
    previous: Option<AttemptRecord>,
    best_fit: Option<AttemptRecord>,
}

impl AttemptHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_attempt(&mut self, record: AttemptRecord) {
        self.previous = Some(record);
    }

    /// Later fits always supersede earlier ones: quality only increases in
    /// the optimal-search phase, so the newest fit is the highest quality.
    pub fn record_best_fit(&mut self, record: AttemptRecord) {
        self.best_fit = Some(record);
    }

    pub fn previous(&self) -> Option<&AttemptRecord> {
        self.previous.as_ref()
    }

    pub fn best_fit(&self) -> Option<&AttemptRecord> {
        self.best_fit.as_ref()
    }

    pub fn has_best_fit(&self) -> bool {
        self.best_fit.is_some()
    }

    /// True when a quality reduction failed to reduce the archive size.
    /// Compares against the immediately preceding attempt only, not the full
    /// history; an oscillating size sequence therefore converges on the
    /// first non-improving step.
    pub fn should_abort_as_regression(&self, current_size_kb: f64) -> bool {
        self.previous
            .as_ref()
            .is_some_and(|prev| current_size_kb >= prev.size_kb)
    }
}
