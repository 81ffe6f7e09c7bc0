pub mod archiver;
pub mod cli;
pub mod constants;
pub mod error;
pub mod history;
pub mod logger;
pub mod minify;
pub mod processor;
pub mod quality;
pub mod runner;
pub mod search;
pub mod staging;
pub mod utils;

pub use archiver::{ArchiveProfile, CommandArchiver, ToolFamily};
pub use error::{ArchiverError, HyperzipError, ProcessorError, Result};
pub use history::{AttemptHistory, AttemptRecord};
pub use processor::ImageAssetProcessor;
pub use quality::{Budget, QualityState};
pub use runner::{run_packing, FolderResult, PackConfig, RunSummary};
pub use search::{
    search_fit, ArchiveResult, Archiver, AssetProcessor, FitSearch, ProcessResult, SearchOutcome,
    SearchStatus,
};
pub use staging::StagedCopy;
