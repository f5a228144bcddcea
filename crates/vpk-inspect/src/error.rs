//! Error types for the inspection tool.

use std::path::PathBuf;
use thiserror::Error;
use vpk_archive::ArchiveError;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Archive path does not name a regular file
    #[error("Archive not found: {0}")]
    ArchiveNotFound(PathBuf),

    /// Load options built from the flags are invalid
    #[error("Invalid load options: {0}")]
    InvalidOptions(#[from] ArchiveError),
}
