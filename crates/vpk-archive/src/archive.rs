//! The loaded archive value

use crate::error::ArchiveResult;
use crate::header::ArchiveHeader;
use crate::loader::ArchiveLoader;
use crate::part::ArchivePart;
use crate::tree::{Directory, DirectoryEntry};
use crate::version::VpkVersion;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A loaded VPK archive
///
/// Values are produced by [`ArchiveLoader`] only after the header verified
/// and the directory tree decoded, and are read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Archive {
    pub(crate) directories: Vec<Directory>,
    pub(crate) is_multi_part: bool,
    pub(crate) parts: Vec<ArchivePart>,
    pub(crate) path: Option<PathBuf>,
    pub(crate) header: Option<ArchiveHeader>,
}

impl Archive {
    /// Load an archive from disk with default options
    pub fn open(path: impl AsRef<Path>, version: VpkVersion) -> ArchiveResult<Self> {
        ArchiveLoader::default().load_path(path, version)
    }

    /// Load an archive from an in-memory directory file with default options
    pub fn from_bytes(data: impl Into<Vec<u8>>, version: VpkVersion) -> ArchiveResult<Self> {
        ArchiveLoader::default().load_bytes(data, version)
    }

    /// Archive state before the tree is read, used by tests
    #[cfg(test)]
    pub(crate) fn with_parts(path: impl Into<PathBuf>, parts: Vec<ArchivePart>) -> Self {
        Self {
            directories: Vec::new(),
            is_multi_part: true,
            parts,
            path: Some(path.into()),
            header: None,
        }
    }

    /// Verified header of the directory file
    pub fn header(&self) -> Option<&ArchiveHeader> {
        self.header.as_ref()
    }

    /// Format version of the directory file
    pub fn version(&self) -> Option<VpkVersion> {
        self.header.as_ref().map(ArchiveHeader::version)
    }

    /// Directories in tree order
    pub fn directories(&self) -> &[Directory] {
        &self.directories
    }

    /// Whether the archive was loaded from a `_dir.vpk` descriptor
    pub fn is_multi_part(&self) -> bool {
        self.is_multi_part
    }

    /// Resolved parts ordered by index, empty unless multi-part
    pub fn parts(&self) -> &[ArchivePart] {
        &self.parts
    }

    /// Path the archive was loaded from, `None` for in-memory loads
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Look up a part by index (`-1` for the descriptor)
    pub fn part(&self, index: i32) -> Option<&ArchivePart> {
        self.parts
            .binary_search_by_key(&index, ArchivePart::index)
            .ok()
            .map(|pos| &self.parts[pos])
    }

    /// Iterate over every entry together with its directory
    pub fn entries(&self) -> impl Iterator<Item = (&Directory, &DirectoryEntry)> {
        self.directories
            .iter()
            .flat_map(|dir| dir.entries.iter().map(move |entry| (dir, entry)))
    }

    /// Number of files in the archive
    pub fn entry_count(&self) -> usize {
        self.directories.iter().map(|dir| dir.entries.len()).sum()
    }

    /// Find an entry by its full `path/name.ext` archive path
    ///
    /// Matching is case-insensitive and accepts `\` as a separator.
    pub fn find(&self, full_path: &str) -> Option<(&Directory, &DirectoryEntry)> {
        let wanted = full_path.replace('\\', "/").to_ascii_lowercase();
        let wanted = wanted.trim_start_matches('/');
        self.entries()
            .find(|(dir, entry)| dir.entry_path(entry).to_ascii_lowercase() == wanted)
    }

    /// Combined size of all parts in bytes
    pub fn total_part_size(&self) -> u64 {
        self.parts.iter().map(ArchivePart::size).sum()
    }
}
