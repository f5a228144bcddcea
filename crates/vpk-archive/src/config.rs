//! Archive load options
//!
//! Options control how companion part files are recognized next to a
//! `_dir.vpk` descriptor. The defaults match the naming Valve's tools produce.

use crate::error::{ArchiveError, ArchiveResult};
use serde::{Deserialize, Serialize};

/// Default file name suffix of a multi-part directory descriptor
pub const DEFAULT_DIR_SUFFIX: &str = "_dir.vpk";

/// Default file extension of archive parts
pub const DEFAULT_PART_EXTENSION: &str = ".vpk";

/// What to do with a sibling whose index segment is not a decimal number
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartIndexPolicy {
    /// Abort resolution with `ArchiveError::InvalidPartIndex`
    #[default]
    Abort,
    /// Log a warning and ignore the file
    Skip,
}

/// Options used by `PartResolver` and `ArchiveLoader`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Suffix marking a multi-part directory descriptor
    pub dir_suffix: String,
    /// Extension stripped from a companion's index segment
    pub part_extension: String,
    /// Handling of companions with a non-numeric index segment
    pub part_index_policy: PartIndexPolicy,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            dir_suffix: DEFAULT_DIR_SUFFIX.to_string(),
            part_extension: DEFAULT_PART_EXTENSION.to_string(),
            part_index_policy: PartIndexPolicy::Abort,
        }
    }
}

impl LoadOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directory descriptor suffix
    pub fn with_dir_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.dir_suffix = suffix.into();
        self
    }

    /// Set the part file extension
    pub fn with_part_extension(mut self, extension: impl Into<String>) -> Self {
        self.part_extension = extension.into();
        self
    }

    /// Set the malformed part index policy
    pub fn with_part_index_policy(mut self, policy: PartIndexPolicy) -> Self {
        self.part_index_policy = policy;
        self
    }

    /// Check whether a file name marks a multi-part directory descriptor
    pub fn is_dir_file_name(&self, file_name: &str) -> bool {
        file_name.ends_with(&self.dir_suffix)
    }

    /// Validate the options
    pub fn validate(&self) -> ArchiveResult<()> {
        if self.dir_suffix.is_empty() {
            return Err(ArchiveError::InvalidConfig(
                "dir_suffix must not be empty".to_string(),
            ));
        }
        // The base name is matched against the text before the last underscore
        if !self.dir_suffix.starts_with('_') {
            return Err(ArchiveError::InvalidConfig(format!(
                "dir_suffix must start with '_': {}",
                self.dir_suffix
            )));
        }
        if self.part_extension.is_empty() {
            return Err(ArchiveError::InvalidConfig(
                "part_extension must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = LoadOptions::default();
        assert_eq!(options.dir_suffix, "_dir.vpk");
        assert_eq!(options.part_extension, ".vpk");
        assert_eq!(options.part_index_policy, PartIndexPolicy::Abort);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_dir_file_name() {
        let options = LoadOptions::default();
        assert!(options.is_dir_file_name("pak01_dir.vpk"));
        assert!(!options.is_dir_file_name("pak01_000.vpk"));
        assert!(!options.is_dir_file_name("pak01_dir.vpk.bak"));
    }

    #[test]
    fn test_validation() {
        assert!(LoadOptions::new().with_dir_suffix("").validate().is_err());
        assert!(
            LoadOptions::new()
                .with_dir_suffix("dir.vpk")
                .validate()
                .is_err()
        );
        assert!(
            LoadOptions::new()
                .with_part_extension("")
                .validate()
                .is_err()
        );
        assert!(
            LoadOptions::new()
                .with_dir_suffix("_index.pak")
                .with_part_extension(".pak")
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_serde_round_trip() {
        let options = LoadOptions::new().with_part_index_policy(PartIndexPolicy::Skip);
        let json = serde_json::to_string(&options).expect("Test operation should succeed");
        assert!(json.contains("\"skip\""));

        let restored: LoadOptions =
            serde_json::from_str(&json).expect("Test operation should succeed");
        assert_eq!(restored, options);

        let partial: LoadOptions = serde_json::from_str(r#"{"part_index_policy":"skip"}"#)
            .expect("Test operation should succeed");
        assert_eq!(partial.dir_suffix, DEFAULT_DIR_SUFFIX);
        assert_eq!(partial.part_index_policy, PartIndexPolicy::Skip);
    }
}
