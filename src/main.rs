use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use hyperzip::cli::{Args, Commands};
use hyperzip::{info, logger};
use hyperzip::{run_packing, ArchiveProfile, Budget, PackConfig, QualityState};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::set_quiet_mode(args.quiet);
    logger::set_verbose_mode(args.verbose);

    match args.command {
        Commands::Pack {
            project_folder,
            max_size_kb,
            profile,
            archiver_path,
            initial_png_level,
            min_png_level,
            initial_jpeg_quality,
            min_jpeg_quality,
            jpeg_quality_step,
            first_fit,
            exclusions,
            no_default_excludes,
            no_images,
            no_minify,
            jobs,
        } => {
            let budget = Budget::new(max_size_kb).context("invalid --max-size-kb")?;
            let initial_quality = QualityState::new(
                initial_png_level,
                min_png_level,
                initial_jpeg_quality,
                min_jpeg_quality,
                jpeg_quality_step,
            )
            .context("invalid quality bounds")?;

            let mut patterns: Vec<String> = if no_default_excludes {
                Vec::new()
            } else {
                hyperzip::constants::DEFAULT_EXCLUSIONS
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            };
            patterns.extend(exclusions);

            let config = PackConfig {
                project_folder,
                budget,
                initial_quality,
                find_optimal: !first_fit,
                profile,
                archiver_path: archiver_path
                    .unwrap_or_else(|| PathBuf::from(profile.default_executable())),
                exclusions: patterns,
                optimize_images: !no_images,
                minify_text: !no_minify,
                jobs,
            };

            let summary = run_packing(&config).context("packing run failed")?;
            if !summary.all_within_budget() {
                info!(
                    "{} folder(s) failed or stayed over budget",
                    summary.fail_count
                );
            }
        }
        Commands::Profiles => {
            for profile in ArchiveProfile::ALL {
                println!(
                    "{:12} tool: {:6} output: {:6} switches: {}",
                    profile.name(),
                    profile.default_executable(),
                    profile.extension(),
                    profile.params().join(" ")
                );
            }
        }
    }

    Ok(())
}
