use std::fs;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::archiver::{ArchiveProfile, CommandArchiver};
use crate::error::{HyperzipError, Result};
use crate::processor::ImageAssetProcessor;
use crate::quality::{Budget, QualityState};
use crate::search::{FitSearch, SearchOutcome, SearchStatus};
use crate::staging;
use crate::{info, warn};

/// One run over a project directory: every immediate sub-folder is packed
/// independently into `<folder><extension>` next to it.
#[derive(Debug, Clone)]
pub struct PackConfig {
    pub project_folder: PathBuf,
    pub budget: Budget,
    pub initial_quality: QualityState,
    pub find_optimal: bool,
    pub profile: ArchiveProfile,
    pub archiver_path: PathBuf,
    pub exclusions: Vec<String>,
    pub optimize_images: bool,
    pub minify_text: bool,
    /// Worker threads for packing folders in parallel. `None` keeps rayon's
    /// default.
    pub jobs: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct FolderResult {
    pub folder: String,
    pub archive_name: String,
    pub outcome: SearchOutcome,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub results: Vec<FolderResult>,
    pub success_count: usize,
    pub fail_count: usize,
    /// Total KB of all produced archives, oversized ones included.
    pub total_size_kb: f64,
    pub oversized: Vec<String>,
}

impl RunSummary {
    pub fn average_success_size_kb(&self) -> f64 {
        if self.success_count == 0 {
            return 0.0;
        }
        let total: f64 = self
            .results
            .iter()
            .filter(|r| r.outcome.status == SearchStatus::Success)
            .map(|r| r.outcome.size_kb)
            .sum();
        total / self.success_count as f64
    }

    pub fn all_within_budget(&self) -> bool {
        self.fail_count == 0
    }
}

/// Finds candidate folders directly under the project directory. Hidden and
/// underscore-prefixed folders are skipped, as are staging leftovers.
fn discover_folders(base_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut folders = Vec::new();
    for entry in fs::read_dir(base_dir)? {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.')
            || name.starts_with('_')
            || name.ends_with(crate::constants::STAGING_SUFFIX)
        {
            continue;
        }
        folders.push(entry.path());
    }
    folders.sort();
    Ok(folders)
}

fn pack_one(
    folder: &Path,
    config: &PackConfig,
    processor: &ImageAssetProcessor,
    archiver: &CommandArchiver,
) -> FolderResult {
    let folder_name = folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| folder.display().to_string());
    let archive_name = format!("{}{}", folder_name, config.profile.extension());
    let output = config.project_folder.join(&archive_name);

    info!("packing {} -> {}", folder_name, archive_name);
    let search = FitSearch::new(
        processor,
        archiver,
        config.budget,
        config.find_optimal,
        &config.exclusions,
    );
    let outcome = search.run(folder, &output, config.initial_quality);

    match outcome.status {
        SearchStatus::Success => info!(
            "ok {} ({:.2} KB, lossless={}, lossy={})",
            archive_name,
            outcome.size_kb,
            outcome.quality.lossless_level,
            outcome.quality.lossy_quality
        ),
        SearchStatus::Oversized => warn!(
            "{} still {:.2} KB over budget at minimum viable quality",
            archive_name,
            outcome.size_kb - config.budget.max_size_kb
        ),
        SearchStatus::Error => warn!("{} failed, skipping", folder_name),
    }

    FolderResult {
        folder: folder_name,
        archive_name,
        outcome,
    }
}

/// Packs every candidate folder under the project directory and aggregates
/// the per-folder outcomes. A folder that errors never stops the run; the
/// remaining folders are still processed.
pub fn run_packing(config: &PackConfig) -> Result<RunSummary> {
    if !config.project_folder.is_dir() {
        return Err(HyperzipError::InvalidProjectFolder(
            config.project_folder.clone(),
        ));
    }

    let folders = discover_folders(&config.project_folder)?;
    if folders.is_empty() {
        info!(
            "no suitable sub-folders found in {}",
            config.project_folder.display()
        );
        return Ok(RunSummary::default());
    }
    info!(
        "found {} folder(s), target <= {} KB, profile {}",
        folders.len(),
        config.budget.max_size_kb,
        config.profile
    );

    let processor = ImageAssetProcessor {
        optimize_png: config.optimize_images,
        recompress_jpeg: config.optimize_images,
        minify_text: config.minify_text,
    };
    let archiver = CommandArchiver::new(config.profile, config.archiver_path.clone());

    let progress = ProgressBar::new(folders.len() as u64);
    progress.set_style(ProgressStyle::default_bar());

    let results: Vec<FolderResult> = match config.jobs {
        Some(1) => folders
            .iter()
            .map(|folder| {
                let result = pack_one(folder, config, &processor, &archiver);
                progress.inc(1);
                result
            })
            .collect(),
        jobs => {
            let mut builder = rayon::ThreadPoolBuilder::new();
            if let Some(n) = jobs {
                builder = builder.num_threads(n);
            }
            let pool = builder
                .build()
                .map_err(|e| HyperzipError::Io(std::io::Error::other(e)))?;
            pool.install(|| {
                folders
                    .par_iter()
                    .map(|folder| {
                        let result = pack_one(folder, config, &processor, &archiver);
                        progress.inc(1);
                        result
                    })
                    .collect()
            })
        }
    };
    progress.finish_and_clear();

    // Staging copies are dropped per attempt; this only catches leftovers
    // from previous interrupted runs.
    if let Ok(removed) = staging::cleanup_stale(&config.project_folder) {
        if removed > 0 {
            info!("removed {} stale working cop(ies)", removed);
        }
    }

    let mut summary = RunSummary::default();
    for result in results {
        match result.outcome.status {
            SearchStatus::Success => {
                summary.success_count += 1;
                summary.total_size_kb += result.outcome.size_kb;
            }
            SearchStatus::Oversized => {
                summary.fail_count += 1;
                summary.total_size_kb += result.outcome.size_kb;
                summary.oversized.push(format!(
                    "{} ({:.2} KB @ lossless={}/lossy={})",
                    result.folder,
                    result.outcome.size_kb,
                    result.outcome.quality.lossless_level,
                    result.outcome.quality.lossy_quality
                ));
            }
            SearchStatus::Error => summary.fail_count += 1,
        }
        summary.results.push(result);
    }

    log_summary(config, &summary);
    Ok(summary)
}

fn log_summary(config: &PackConfig, summary: &RunSummary) {
    info!("=============== Summary ===============");
    info!("profile used: {}", config.profile);
    info!(
        "successful archives (<= {} KB): {}",
        config.budget.max_size_kb, summary.success_count
    );
    info!("failed/oversized archives: {}", summary.fail_count);
    info!(
        "total size of final archives: {:.2} KB",
        summary.total_size_kb
    );
    if summary.success_count > 0 {
        info!(
            "average size of successful archives: {:.2} KB",
            summary.average_success_size_kb()
        );
    }
    for (i, entry) in summary.oversized.iter().enumerate() {
        warn!("{}. exceeded budget: {}", i + 1, entry);
    }
    info!("=======================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn config(project: &Path) -> PackConfig {
        PackConfig {
            project_folder: project.to_path_buf(),
            budget: Budget::new(150.0).unwrap(),
            initial_quality: QualityState::new(8, 1, 90, 10, 10).unwrap(),
            find_optimal: false,
            profile: ArchiveProfile::SevenzipZip,
            archiver_path: PathBuf::from("hyperzip-no-such-archiver"),
            exclusions: vec![],
            optimize_images: false,
            minify_text: false,
            jobs: Some(1),
        }
    }

    #[test]
    fn discover_skips_hidden_and_staging_dirs() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("banner_a")).unwrap();
        fs::create_dir(dir.path().join("banner_b")).unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::create_dir(dir.path().join("_drafts")).unwrap();
        fs::create_dir(dir.path().join("banner_a_temp")).unwrap();
        File::create(dir.path().join("readme.txt")).unwrap();

        let folders = discover_folders(dir.path()).unwrap();
        let names: Vec<_> = folders
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["banner_a", "banner_b"]);
    }

    #[test]
    fn invalid_project_folder_is_rejected() {
        let result = run_packing(&config(Path::new("/definitely/not/here")));
        assert!(matches!(
            result,
            Err(HyperzipError::InvalidProjectFolder(_))
        ));
    }

    #[test]
    fn empty_project_folder_yields_empty_summary() {
        let dir = TempDir::new().unwrap();
        let summary = run_packing(&config(dir.path())).unwrap();
        assert!(summary.results.is_empty());
        assert!(summary.all_within_budget());
    }

    #[test]
    fn archiver_failure_does_not_stop_the_run() {
        let dir = TempDir::new().unwrap();
        for name in ["banner_a", "banner_b"] {
            let folder = dir.path().join(name);
            fs::create_dir(&folder).unwrap();
            File::create(folder.join("index.html"))
                .unwrap()
                .write_all(b"<html></html>")
                .unwrap();
        }

        let summary = run_packing(&config(dir.path())).unwrap();
        assert_eq!(summary.results.len(), 2);
        assert_eq!(summary.fail_count, 2);
        assert_eq!(summary.success_count, 0);
        assert!(summary
            .results
            .iter()
            .all(|r| r.outcome.status == SearchStatus::Error));
    }

    #[test]
    fn average_success_size_over_mixed_results() {
        let quality = QualityState::new(8, 1, 90, 10, 10).unwrap();
        let mut summary = RunSummary::default();
        for (size, status) in [
            (100.0, SearchStatus::Success),
            (120.0, SearchStatus::Success),
            (300.0, SearchStatus::Oversized),
        ] {
            summary.results.push(FolderResult {
                folder: "x".into(),
                archive_name: "x.zip".into(),
                outcome: SearchOutcome {
                    status,
                    size_kb: size,
                    quality,
                },
            });
            match status {
                SearchStatus::Success => summary.success_count += 1,
                _ => summary.fail_count += 1,
            }
        }
        assert_eq!(summary.average_success_size_kb(), 110.0);
        assert!(!summary.all_within_budget());
    }
}
