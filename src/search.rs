use std::path::Path;

use crate::constants::ERROR_SIZE_KB;
use crate::error::{ArchiverError, HyperzipError, ProcessorError};
use crate::history::{AttemptHistory, AttemptRecord};
use crate::quality::{Budget, QualityState};
use crate::staging::StagedCopy;
use crate::{info, verbose, warn};

/// Outcome classification for one folder's search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Success,
    Oversized,
    Error,
}

/// Final result of one folder's fit search. Produced exactly once per
/// folder; the caller classifies and aggregates across folders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    pub status: SearchStatus,
    pub size_kb: f64,
    pub quality: QualityState,
}

impl SearchOutcome {
    /// Classifies a measured size against the budget.
    fn resolved(size_kb: f64, quality: QualityState, budget: &Budget) -> Self {
        let status = if budget.fits(size_kb) {
            SearchStatus::Success
        } else {
            SearchStatus::Oversized
        };
        Self {
            status,
            size_kb,
            quality,
        }
    }

    /// Hard-failure outcome with the sentinel size.
    fn error(quality: QualityState) -> Self {
        Self {
            status: SearchStatus::Error,
            size_kb: ERROR_SIZE_KB,
            quality,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessResult {
    pub bytes_saved: i64,
    pub original_bytes: u64,
    /// True when at least one lossy re-encode ran.
    pub degraded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchiveResult {
    pub size_kb: f64,
}

/// Re-encodes the assets inside a working copy at the given quality.
pub trait AssetProcessor {
    fn process(
        &self,
        working_dir: &Path,
        quality: &QualityState,
    ) -> Result<ProcessResult, ProcessorError>;
}

/// Produces an archive from a working copy and reports its size.
pub trait Archiver {
    fn build(
        &self,
        working_dir: &Path,
        output_path: &Path,
        exclusions: &[String],
    ) -> Result<ArchiveResult, ArchiverError>;
}

/// The fit-to-budget search loop for a single folder.
///
/// Each attempt stages a fresh working copy of the input, re-encodes its
/// assets at the current quality, archives the copy, and measures the
/// result. The policy then either converges, fails, or adjusts quality for
/// the next attempt:
///
/// - Under budget with `find_optimal` off: first fit wins.
/// - Under budget with `find_optimal` on: remember the fit, raise quality
///   one step and retry; converge on the stored best fit once quality is
///   back at its initial value or a raise overshoots.
/// - Over budget: revert to a stored best fit if one exists; otherwise stop
///   early if shrinking stopped shrinking (plateau), fail once both knobs
///   sit at their minimum, or lower quality and retry.
/// - Any collaborator hard failure ends the search immediately with the
///   sentinel size.
///
/// The working copy is released on every exit path, including errors.
pub struct FitSearch<'a> {
    processor: &'a dyn AssetProcessor,
    archiver: &'a dyn Archiver,
    budget: Budget,
    find_optimal: bool,
    exclusions: &'a [String],
}

impl<'a> FitSearch<'a> {
    pub fn new(
        processor: &'a dyn AssetProcessor,
        archiver: &'a dyn Archiver,
        budget: Budget,
        find_optimal: bool,
        exclusions: &'a [String],
    ) -> Self {
        Self {
            processor,
            archiver,
            budget,
            find_optimal,
            exclusions,
        }
    }

    pub fn run(&self, folder: &Path, output: &Path, initial: QualityState) -> SearchOutcome {
        let mut quality = initial;
        let mut history = AttemptHistory::new();
        let mut attempt: u32 = 1;

        loop {
            verbose!(
                "attempt {} (lossless={}, lossy={})",
                attempt,
                quality.lossless_level,
                quality.lossy_quality
            );

            let size_kb = match self.measure_attempt(folder, output, &quality) {
                Ok(size_kb) => size_kb,
                Err(e) => {
                    warn!("attempt {} failed: {}", attempt, e);
                    return SearchOutcome::error(quality);
                }
            };
            info!("  archive size: {:.2} KB", size_kb);

            if self.budget.fits(size_kb) {
                if !self.find_optimal {
                    return SearchOutcome::resolved(size_kb, quality, &self.budget);
                }

                let fit = AttemptRecord {
                    attempt,
                    size_kb,
                    quality,
                    status: SearchStatus::Success,
                };
                history.record_best_fit(fit);

                if quality.increase() {
                    history.record_attempt(fit);
                    attempt += 1;
                    continue;
                }
                // Already back at initial quality on both knobs.
                return SearchOutcome::resolved(fit.size_kb, fit.quality, &self.budget);
            }

            // Over budget. A raise during the optimal search overshot;
            // revert to the stored fit.
            if self.find_optimal {
                if let Some(best) = history.best_fit() {
                    verbose!(
                        "over budget after raise, reverting to best fit ({:.2} KB)",
                        best.size_kb
                    );
                    return SearchOutcome::resolved(best.size_kb, best.quality, &self.budget);
                }
            }

            if attempt > 1 && history.should_abort_as_regression(size_kb) {
                let Some(prev) = history.previous().copied() else {
                    return SearchOutcome::resolved(size_kb, quality, &self.budget);
                };
                warn!(
                    "size did not decrease ({:.2} KB >= {:.2} KB), keeping attempt {}",
                    size_kb, prev.size_kb, prev.attempt
                );
                return SearchOutcome::resolved(prev.size_kb, prev.quality, &self.budget);
            }

            if quality.at_minimum() {
                warn!(
                    "minimum quality reached, still {:.2} KB over budget",
                    size_kb - self.budget.max_size_kb
                );
                return SearchOutcome::resolved(size_kb, quality, &self.budget);
            }

            let reached = quality;
            if !quality.decrease(size_kb, &self.budget) {
                return SearchOutcome::resolved(size_kb, reached, &self.budget);
            }
            history.record_attempt(AttemptRecord {
                attempt,
                size_kb,
                quality: reached,
                status: SearchStatus::Oversized,
            });
            attempt += 1;
        }
    }

    /// Stages a fresh working copy, runs both collaborators against it, and
    /// returns the measured archive size. The copy is dropped (deleted) when
    /// this returns, on success and on error alike.
    fn measure_attempt(
        &self,
        folder: &Path,
        output: &Path,
        quality: &QualityState,
    ) -> Result<f64, HyperzipError> {
        let staged = StagedCopy::create(folder, self.exclusions)?;
        let processed = self.processor.process(staged.path(), quality)?;
        verbose!(
            "assets: {} bytes saved of {}",
            processed.bytes_saved,
            crate::utils::format_file_size(processed.original_bytes)
        );
        let archive = self.archiver.build(staged.path(), output, self.exclusions)?;
        Ok(archive.size_kb)
    }
}

/// One-call entry point for a single folder's search.
#[allow(clippy::too_many_arguments)]
pub fn search_fit(
    folder_path: &Path,
    output_path: &Path,
    budget: Budget,
    initial_quality: QualityState,
    find_optimal: bool,
    exclusions: &[String],
    asset_processor: &dyn AssetProcessor,
    archiver: &dyn Archiver,
) -> SearchOutcome {
    FitSearch::new(asset_processor, archiver, budget, find_optimal, exclusions)
        .run(folder_path, output_path, initial_quality)
}
