pub const DEFAULT_MAX_SIZE_KB: f64 = 150.0;

pub const DEFAULT_INITIAL_LOSSLESS_LEVEL: u8 = 8;
pub const DEFAULT_MIN_LOSSLESS_LEVEL: u8 = 1;
pub const DEFAULT_INITIAL_LOSSY_QUALITY: u8 = 90;
pub const DEFAULT_MIN_LOSSY_QUALITY: u8 = 10;
pub const DEFAULT_LOSSY_QUALITY_STEP: u8 = 10;

/// Sentinel size reported for searches that end in a hard error.
pub const ERROR_SIZE_KB: f64 = -1.0;

/// oxipng presets stop at 6; higher lossless levels are clamped down.
pub const MAX_OXIPNG_PRESET: u8 = 6;

/// JPEG re-encoding is skipped at or above this quality, and the applied
/// quality never drops below the floor regardless of the search state.
pub const JPEG_REENCODE_CEILING: u8 = 95;
pub const JPEG_REENCODE_FLOOR: u8 = 10;

/// Suffix for per-attempt working copies placed next to the source folder.
pub const STAGING_SUFFIX: &str = "_temp";

pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    "*.ini",
    "*.db",
    "*.fla",
    "*.psd",
    "*.pdf",
    "*.ai",
    "*.zip",
    "*.rar",
    "*.7z",
    "*.zpaq",
    "*.DS_Store",
    "Thumbs.db",
    "*~",
];

pub const PNG_EXTENSIONS: &[&str] = &["png"];
pub const JPEG_EXTENSIONS: &[&str] = &["jpg", "jpeg"];
pub const TEXT_EXTENSIONS: &[&str] = &["html", "js", "css"];
