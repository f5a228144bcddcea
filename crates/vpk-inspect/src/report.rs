//! Inspection reports and their text rendering.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use vpk_archive::{Archive, ArchiveHeader, ArchivePart, EntryLocation, VpkVersion};

/// Physical files of an archive
#[derive(Debug, Clone, Serialize)]
pub struct PartsReport {
    /// Path that was inspected
    pub archive: PathBuf,
    /// Whether the path names a `_dir.vpk` directory file
    pub multi_part: bool,
    /// Parts ordered by index, empty for single-file archives
    pub parts: Vec<ArchivePart>,
}

impl PartsReport {
    /// Build a report from resolved parts
    pub fn new(archive: &Path, multi_part: bool, parts: Vec<ArchivePart>) -> Self {
        Self {
            archive: archive.to_path_buf(),
            multi_part,
            parts,
        }
    }

    /// Combined size of all parts in bytes
    pub fn total_size(&self) -> u64 {
        self.parts.iter().map(ArchivePart::size).sum()
    }
}

/// One file stored in an archive
#[derive(Debug, Clone, Serialize)]
pub struct EntryRow {
    /// Full archive path
    pub path: String,
    /// Size including preload bytes
    pub size: u64,
    /// Stored CRC32
    pub crc: u32,
    /// Payload location
    pub location: EntryLocation,
}

/// Every file stored in an archive, in tree order
#[derive(Debug, Clone, Serialize)]
pub struct ListReport {
    /// Files in tree order
    pub entries: Vec<EntryRow>,
}

impl From<&Archive> for ListReport {
    fn from(archive: &Archive) -> Self {
        let entries = archive
            .entries()
            .map(|(dir, entry)| EntryRow {
                path: dir.entry_path(entry),
                size: entry.total_size(),
                crc: entry.crc,
                location: entry.location,
            })
            .collect();
        Self { entries }
    }
}

/// Archive summary
#[derive(Debug, Clone, Serialize)]
pub struct InfoReport {
    /// Path that was loaded
    pub archive: PathBuf,
    /// Format version of the directory file
    pub version: Option<VpkVersion>,
    /// Directory tree size in bytes
    pub tree_size: Option<u32>,
    /// Whether the archive spans several files
    pub multi_part: bool,
    /// Number of physical files including the directory file
    pub part_count: usize,
    /// Combined size of all parts in bytes
    pub total_part_size: u64,
    /// Number of (extension, path) groups in the tree
    pub directory_count: usize,
    /// Number of files in the tree
    pub entry_count: usize,
    /// Files stored inside the directory file
    pub embedded_entries: usize,
}

impl From<&Archive> for InfoReport {
    fn from(archive: &Archive) -> Self {
        let embedded_entries = archive
            .entries()
            .filter(|(_, entry)| matches!(entry.location, EntryLocation::Embedded { .. }))
            .count();
        Self {
            archive: archive.path().map(Path::to_path_buf).unwrap_or_default(),
            version: archive.version(),
            tree_size: archive.header().map(ArchiveHeader::tree_size),
            multi_part: archive.is_multi_part(),
            part_count: archive.parts().len(),
            total_part_size: archive.total_part_size(),
            directory_count: archive.directories().len(),
            entry_count: archive.entry_count(),
            embedded_entries,
        }
    }
}

/// Output of one inspection command
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Report {
    /// `parts` output
    Parts(PartsReport),
    /// `list` output
    List(ListReport),
    /// `info` output
    Info(InfoReport),
}

impl Report {
    /// Render as pretty JSON or as text
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render(&self, json: bool) -> Result<String, serde_json::Error> {
        if json {
            serde_json::to_string_pretty(self)
        } else {
            Ok(self.to_string())
        }
    }
}

fn location_label(location: &EntryLocation) -> String {
    match location {
        EntryLocation::Embedded { offset } => format!("dir+{offset}"),
        EntryLocation::Part { index, offset } => format!("{index:03}+{offset}"),
    }
}

impl fmt::Display for PartsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.multi_part {
            return write!(f, "{}: single-file archive", self.archive.display());
        }
        writeln!(
            f,
            "{}: {} parts, {} bytes",
            self.archive.display(),
            self.parts.len(),
            self.total_size()
        )?;
        for part in &self.parts {
            writeln!(
                f,
                "{:>5} {:>12}  {}",
                part.index(),
                part.size(),
                part.path().display()
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for ListReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.entries {
            writeln!(
                f,
                "{:08x} {:>12} {:<16} {}",
                row.crc,
                row.size,
                location_label(&row.location),
                row.path
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for InfoReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Archive:     {}", self.archive.display())?;
        match self.version {
            Some(version) => writeln!(f, "Version:     {version}")?,
            None => writeln!(f, "Version:     unknown")?,
        }
        if let Some(tree_size) = self.tree_size {
            writeln!(f, "Tree size:   {tree_size}")?;
        }
        writeln!(f, "Multi-part:  {}", if self.multi_part { "yes" } else { "no" })?;
        if self.multi_part {
            writeln!(
                f,
                "Parts:       {} ({} bytes)",
                self.part_count, self.total_part_size
            )?;
        }
        writeln!(f, "Directories: {}", self.directory_count)?;
        writeln!(
            f,
            "Entries:     {} ({} embedded)",
            self.entry_count, self.embedded_entries
        )
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parts(report) => fmt::Display::fmt(report, f),
            Self::List(report) => fmt::Display::fmt(report, f),
            Self::Info(report) => fmt::Display::fmt(report, f),
        }
    }
}
