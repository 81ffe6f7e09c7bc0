use std::path::PathBuf;
use thiserror::Error;

/// Failures an [`AssetProcessor`](crate::search::AssetProcessor) can report.
///
/// `CredentialInvalid` models a remote compression service rejecting its key
/// mid-run; the in-process adapter never produces it, but the search treats
/// it the same as any other hard processor failure.
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("compression service credential rejected: {0}")]
    CredentialInvalid(String),

    #[error("compression tool unavailable: {0}")]
    ToolUnavailable(String),

    #[error("I/O error while processing assets: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures an [`Archiver`](crate::search::Archiver) can report.
#[derive(Debug, Error)]
pub enum ArchiverError {
    #[error("archiver executable not found: {0}")]
    ToolNotFound(PathBuf),

    #[error("archiver exited with code {code}: {message}")]
    NonZeroExit { code: i32, message: String },

    #[error("archive file missing after archiver run: {0}")]
    OutputMissing(PathBuf),

    #[error("I/O error while archiving: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum HyperzipError {
    #[error("project folder not found or not a directory: {0}")]
    InvalidProjectFolder(PathBuf),

    #[error("invalid size budget: {0} KB (must be > 0)")]
    InvalidBudget(f64),

    #[error("invalid quality bounds: {0}")]
    InvalidQuality(String),

    #[error(transparent)]
    Processor(#[from] ProcessorError),

    #[error(transparent)]
    Archiver(#[from] ArchiverError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HyperzipError>;
