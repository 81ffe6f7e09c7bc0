use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::archiver::ArchiveProfile;

#[derive(Parser)]
#[command(
    name = "hyperzip",
    about = "Packs content folders into size-constrained archives",
    long_about = "hyperzip packs each sub-folder of a project directory (e.g. ad banners) into \
                  an archive that fits under a byte budget, by iteratively re-encoding PNG/JPEG \
                  assets at lower quality and re-archiving until the target size is met.",
    version,
    after_help = "EXAMPLES:\n  \
    hyperzip pack ./banners -s 150\n  \
    hyperzip pack ./banners --profile 7zip_7z --archiver-path /usr/bin/7z --first-fit\n  \
    hyperzip profiles"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Suppress progress output")]
    pub quiet: bool,

    #[arg(short, long, global = true, help = "Log every attempt in detail")]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Pack every sub-folder of a project directory to the size budget",
        long_about = "Each immediate sub-folder is copied, its assets re-encoded, and the copy \
                      archived. Quality is lowered step by step until the archive fits the \
                      budget or quality bottoms out. By default the search then raises quality \
                      again to find the best quality that still fits."
    )]
    Pack {
        #[arg(help = "Directory whose sub-folders are packed")]
        project_folder: PathBuf,

        #[arg(
            short = 's',
            long,
            default_value_t = crate::constants::DEFAULT_MAX_SIZE_KB,
            help = "Size budget per archive in KB"
        )]
        max_size_kb: f64,

        #[arg(
            long,
            default_value = "7zip_zip",
            help = "Archiver/container profile (see `hyperzip profiles`)"
        )]
        profile: ArchiveProfile,

        #[arg(
            long,
            help = "Path to the archiver executable (defaults to the profile's tool name on PATH)"
        )]
        archiver_path: Option<PathBuf>,

        #[arg(
            long,
            default_value_t = crate::constants::DEFAULT_INITIAL_LOSSLESS_LEVEL,
            help = "Starting PNG optimization level"
        )]
        initial_png_level: u8,

        #[arg(
            long,
            default_value_t = crate::constants::DEFAULT_MIN_LOSSLESS_LEVEL,
            help = "Lowest PNG optimization level tried"
        )]
        min_png_level: u8,

        #[arg(
            long,
            default_value_t = crate::constants::DEFAULT_INITIAL_LOSSY_QUALITY,
            help = "Starting JPEG quality"
        )]
        initial_jpeg_quality: u8,

        #[arg(
            long,
            default_value_t = crate::constants::DEFAULT_MIN_LOSSY_QUALITY,
            help = "Lowest JPEG quality tried"
        )]
        min_jpeg_quality: u8,

        #[arg(
            long,
            default_value_t = crate::constants::DEFAULT_LOSSY_QUALITY_STEP,
            help = "Base JPEG quality step"
        )]
        jpeg_quality_step: u8,

        #[arg(
            long,
            help = "Stop at the first fitting quality instead of searching for the best one"
        )]
        first_fit: bool,

        #[arg(
            long = "exclude",
            value_name = "PATTERN",
            help = "Extra exclusion pattern (repeatable), added to the built-in set"
        )]
        exclusions: Vec<String>,

        #[arg(long, help = "Ignore the built-in exclusion patterns")]
        no_default_excludes: bool,

        #[arg(long, help = "Skip PNG/JPEG re-encoding")]
        no_images: bool,

        #[arg(long, help = "Skip HTML/JS/CSS minification")]
        no_minify: bool,

        #[arg(
            short = 'j',
            long,
            help = "Folders packed in parallel (default: one per CPU core)"
        )]
        jobs: Option<usize>,
    },

    #[command(about = "List the available archiver profiles")]
    Profiles,
}
