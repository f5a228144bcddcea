//! Discovery of the physical files making up a multi-part archive
//!
//! A multi-part archive consists of a directory descriptor named
//! `<base>_dir.vpk` and numbered data files `<base>_000.vpk`,
//! `<base>_001.vpk`, ... in the same directory. The resolver scans that
//! directory and returns every part ordered by index, with the descriptor
//! first at index [`MAIN_PART_INDEX`].

use crate::config::{LoadOptions, PartIndexPolicy};
use crate::error::{ArchiveError, ArchiveResult};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Index reserved for the directory descriptor file
pub const MAIN_PART_INDEX: i32 = -1;

/// One physical file contributing to an archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchivePart {
    size: u64,
    index: i32,
    path: PathBuf,
}

impl ArchivePart {
    /// Create a part description
    pub fn new(size: u64, index: i32, path: impl Into<PathBuf>) -> Self {
        Self {
            size,
            index,
            path: path.into(),
        }
    }

    /// File length in bytes at discovery time
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Part index, `-1` for the directory descriptor
    pub const fn index(&self) -> i32 {
        self.index
    }

    /// Location of the part on disk
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether this part is the directory descriptor
    pub const fn is_main(&self) -> bool {
        self.index == MAIN_PART_INDEX
    }
}

/// Resolves the ordered part list of a multi-part archive
#[derive(Debug, Clone, Default)]
pub struct PartResolver {
    options: LoadOptions,
}

impl PartResolver {
    /// Create a resolver with the given options
    pub fn new(options: LoadOptions) -> Self {
        Self { options }
    }

    /// Options used by this resolver
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Whether `path` names a multi-part directory descriptor
    pub fn is_multi_part(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self.options.is_dir_file_name(name))
    }

    /// Resolve all parts belonging to the archive whose descriptor is `main_path`
    ///
    /// Returns an empty list when the file name does not carry the directory
    /// suffix. Only file system metadata is read.
    pub fn resolve(&self, main_path: &Path) -> ArchiveResult<Vec<ArchivePart>> {
        let Some(main_name) = main_path.file_name().and_then(|name| name.to_str()) else {
            return Ok(Vec::new());
        };
        let Some(base_name) = main_name.strip_suffix(self.options.dir_suffix.as_str()) else {
            return Ok(Vec::new());
        };

        let dir = match main_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut parts = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            // Follows symlinks, so linked parts count as regular files
            let metadata = fs::metadata(entry.path())?;
            if !metadata.is_file() {
                continue;
            }

            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if name == main_name {
                continue;
            }

            let Some(index) = self.part_index(base_name, name, &entry.path())? else {
                continue;
            };

            let size = metadata.len();
            debug!("Found archive part {} ({} bytes): {}", index, size, name);
            parts.push(ArchivePart::new(size, index, entry.path()));
        }

        let main_size = fs::metadata(main_path)?.len();
        parts.push(ArchivePart::new(main_size, MAIN_PART_INDEX, main_path));

        parts.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.path.cmp(&b.path)));
        Ok(parts)
    }

    /// Extract the part index from a sibling's file name
    ///
    /// `Ok(None)` means the file belongs to another archive family.
    fn part_index(&self, base_name: &str, name: &str, path: &Path) -> ArchiveResult<Option<i32>> {
        let Some((stem, suffix)) = name.rsplit_once('_') else {
            return Ok(None);
        };
        if stem != base_name {
            return Ok(None);
        }

        let segment = suffix
            .strip_suffix(self.options.part_extension.as_str())
            .unwrap_or(suffix);

        match parse_index(segment) {
            Some(index) => Ok(Some(index)),
            None => match self.options.part_index_policy {
                PartIndexPolicy::Abort => Err(ArchiveError::InvalidPartIndex {
                    path: path.to_path_buf(),
                    segment: segment.to_string(),
                }),
                PartIndexPolicy::Skip => {
                    warn!("Skipping file with invalid part index: {}", path.display());
                    Ok(None)
                }
            },
        }
    }
}

/// Parse a non-negative base-10 part index made of ASCII digits only
fn parse_index(segment: &str) -> Option<i32> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse::<i32>().ok()
}
