//! Command-line inspection of Valve VPK archives.
//!
//! The tool is a thin layer over `vpk-archive`:
//! - `parts`: resolve the physical files of a `_dir.vpk` archive
//! - `list`: load the archive and list every stored file
//! - `info`: load the archive and summarize it
//!
//! # Example
//!
//! ```no_run
//! use vpk_inspect::{InspectConfig, run};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = InspectConfig::from_args();
//!     print!("{}", run(&config)?);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod error;
pub mod report;

pub use config::{Command, InspectConfig};
pub use error::ConfigError;
pub use report::{EntryRow, InfoReport, ListReport, PartsReport, Report};

use anyhow::Context;
use std::path::Path;
use vpk_archive::{Archive, ArchiveLoader, PartResolver};

/// Run the configured command and return its rendered output.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the archive cannot be
/// loaded or part resolution fails.
pub fn run(config: &InspectConfig) -> anyhow::Result<String> {
    config.validate()?;
    let loader = ArchiveLoader::new(config.load_options())?;

    let report = match &config.command {
        Command::Parts { path } => Report::Parts(resolve_parts(&loader, path)?),
        Command::List {
            path,
            format_version,
        } => Report::List(ListReport::from(&load(&loader, path, *format_version)?)),
        Command::Info {
            path,
            format_version,
        } => Report::Info(InfoReport::from(&load(&loader, path, *format_version)?)),
    };

    Ok(report.render(config.json)?)
}

fn resolve_parts(loader: &ArchiveLoader, path: &Path) -> anyhow::Result<PartsReport> {
    let resolver = PartResolver::new(loader.options().clone());
    if !resolver.is_multi_part(path) {
        return Ok(PartsReport::new(path, false, Vec::new()));
    }
    let parts = resolver
        .resolve(path)
        .with_context(|| format!("Failed to resolve parts of {}", path.display()))?;
    tracing::debug!("Resolved {} parts for {}", parts.len(), path.display());
    Ok(PartsReport::new(path, true, parts))
}

fn load(
    loader: &ArchiveLoader,
    path: &Path,
    format_version: Option<u32>,
) -> anyhow::Result<Archive> {
    let archive = match format_version {
        Some(version) => loader.load_path_raw(path, version),
        None => loader.load_path_detected(path),
    };
    archive.with_context(|| format!("Failed to load {}", path.display()))
}
