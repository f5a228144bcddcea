//! Command-line configuration.
//!
//! Every global flag can also be set through an environment variable
//! (`VPK_INSPECT_JSON`, `VPK_INSPECT_DIR_SUFFIX`, ...). Flags given on the
//! command line take precedence.
//!
//! # Example
//!
//! ```
//! use clap::Parser;
//! use vpk_inspect::{Command, InspectConfig};
//!
//! let config = InspectConfig::try_parse_from([
//!     "vpk-inspect",
//!     "--skip-malformed-parts",
//!     "parts",
//!     "hl2_textures_dir.vpk",
//! ])
//! .expect("Arguments should parse");
//!
//! assert!(matches!(config.command, Command::Parts { .. }));
//! assert_eq!(config.load_options().dir_suffix, "_dir.vpk");
//! ```

use crate::error::ConfigError;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use vpk_archive::config::{DEFAULT_DIR_SUFFIX, DEFAULT_PART_EXTENSION};
use vpk_archive::{LoadOptions, PartIndexPolicy};

/// Inspection configuration loaded from CLI args and environment variables.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "vpk-inspect",
    about = "Inspect single-file and multi-part Valve VPK archives",
    version
)]
pub struct InspectConfig {
    /// What to inspect
    #[command(subcommand)]
    pub command: Command,

    /// Print reports as JSON
    #[arg(long, global = true, env = "VPK_INSPECT_JSON")]
    pub json: bool,

    /// Ignore companion files whose part index is not a number
    #[arg(long, global = true, env = "VPK_INSPECT_SKIP_MALFORMED_PARTS")]
    pub skip_malformed_parts: bool,

    /// File name suffix marking a multi-part directory file
    #[arg(
        long,
        global = true,
        env = "VPK_INSPECT_DIR_SUFFIX",
        default_value = DEFAULT_DIR_SUFFIX
    )]
    pub dir_suffix: String,

    /// Extension stripped from part file names before parsing the index
    #[arg(
        long,
        global = true,
        env = "VPK_INSPECT_PART_EXTENSION",
        default_value = DEFAULT_PART_EXTENSION
    )]
    pub part_extension: String,
}

/// Inspection subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List the physical files making up an archive
    Parts {
        /// Path to a `_dir.vpk` or single-file archive
        path: PathBuf,
    },

    /// List every file stored in an archive
    List {
        /// Path to a `_dir.vpk` or single-file archive
        path: PathBuf,

        /// Format version (1 or 2), detected from the header when omitted
        #[arg(long)]
        format_version: Option<u32>,
    },

    /// Summarize an archive
    Info {
        /// Path to a `_dir.vpk` or single-file archive
        path: PathBuf,

        /// Format version (1 or 2), detected from the header when omitted
        #[arg(long)]
        format_version: Option<u32>,
    },
}

impl Command {
    /// Archive path the command operates on.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Parts { path } | Self::List { path, .. } | Self::Info { path, .. } => path,
        }
    }

    /// Requested format version, if any.
    #[must_use]
    pub const fn format_version(&self) -> Option<u32> {
        match self {
            Self::Parts { .. } => None,
            Self::List { format_version, .. } | Self::Info { format_version, .. } => {
                *format_version
            }
        }
    }
}

impl InspectConfig {
    /// Parse configuration from command-line arguments.
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Build archive load options from the flags.
    #[must_use]
    pub fn load_options(&self) -> LoadOptions {
        let policy = if self.skip_malformed_parts {
            PartIndexPolicy::Skip
        } else {
            PartIndexPolicy::Abort
        };
        LoadOptions::new()
            .with_dir_suffix(self.dir_suffix.clone())
            .with_part_extension(self.part_extension.clone())
            .with_part_index_policy(policy)
    }

    /// Validate configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The archive path is not a regular file
    /// - The suffix or extension flags are invalid
    pub fn validate(&self) -> Result<(), ConfigError> {
        let path = self.command.path();
        if !path.is_file() {
            return Err(ConfigError::ArchiveNotFound(path.to_path_buf()));
        }

        self.load_options().validate()?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> InspectConfig {
        InspectConfig::try_parse_from(std::iter::once("vpk-inspect").chain(args.iter().copied()))
            .expect("Arguments should parse")
    }

    #[test]
    fn test_cli_definition() {
        InspectConfig::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["info", "pak01_dir.vpk"]);
        assert!(!config.json);
        assert_eq!(config.load_options(), LoadOptions::default());
        assert_eq!(config.command.format_version(), None);
        assert_eq!(config.command.path(), Path::new("pak01_dir.vpk"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let config = parse(&[
            "list",
            "pak01_dir.vpk",
            "--json",
            "--skip-malformed-parts",
            "--format-version",
            "1",
        ]);
        assert!(config.json);
        assert_eq!(config.load_options().part_index_policy, PartIndexPolicy::Skip);
        assert_eq!(config.command.format_version(), Some(1));
    }

    #[test]
    fn test_parts_rejects_format_version() {
        let result = InspectConfig::try_parse_from([
            "vpk-inspect",
            "parts",
            "pak01_dir.vpk",
            "--format-version",
            "2",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_missing_archive() {
        let config = parse(&["parts", "/nonexistent/pak01_dir.vpk"]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ArchiveNotFound(_))
        ));
    }

    #[test]
    fn test_validate_bad_suffix() {
        let file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        let path = file.path().to_str().expect("Temp path should be UTF-8");
        let config = parse(&["--dir-suffix", "dir.vpk", "parts", path]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidOptions(_))
        ));
    }
}
