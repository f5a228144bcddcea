//! Error types for archive loading

use std::path::PathBuf;
use thiserror::Error;

/// Archive operation result type
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Errors raised while resolving, reading or loading an archive
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Header was read but failed structural verification
    #[error("Invalid archive header")]
    InvalidHeader,

    /// A companion file's trailing segment is not a decimal part index
    #[error("Invalid archive part index '{segment}' in {}", path.display())]
    InvalidPartIndex {
        /// Path of the offending companion file
        path: PathBuf,
        /// Segment that failed to parse
        segment: String,
    },

    /// Requested format version is not supported
    #[error("Unsupported archive version: {0}")]
    UnsupportedVersion(u32),

    /// Directory tree could not be decoded
    #[error("Malformed directory tree: {reason}")]
    MalformedTree {
        /// Detailed description of the problem
        reason: String,
    },

    /// Load options failed validation
    #[error("Invalid load options: {0}")]
    InvalidConfig(String),

    /// Binary read error
    #[error("Binary format error: {0}")]
    BinRead(#[from] binrw::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArchiveError {
    /// Check if this error describes malformed archive content
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidHeader
                | Self::InvalidPartIndex { .. }
                | Self::MalformedTree { .. }
                | Self::BinRead(_)
        )
    }

    /// Check if this error came from the file system
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::Io(_) | Self::BinRead(binrw::Error::Io(_)))
    }
}
