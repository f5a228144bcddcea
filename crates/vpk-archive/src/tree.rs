//! Directory tree model and decoder
//!
//! The tree follows the header and is organized in three levels of
//! null-terminated strings: extension, then path, then file name. Every
//! level ends with an empty string. Each file name is followed by a fixed
//! 18-byte record and optional preload bytes.
//!
//! ```text
//! for extension:
//!     for path:
//!         for file name:
//!             crc:u32 preload_bytes:u16 archive_index:u16
//!             entry_offset:u32 entry_length:u32 terminator:u16
//!             preload[preload_bytes]
//! ```

use crate::archive::Archive;
use crate::error::{ArchiveError, ArchiveResult};
use crate::header::ArchiveHeader;
use binrw::{BinRead, NullString};
use serde::Serialize;
use std::io::{Read, Seek, SeekFrom};
use tracing::{debug, warn};

/// Archive index marking data stored in the directory file itself
pub const EMBEDDED_ARCHIVE_INDEX: u16 = 0x7FFF;

/// Terminator closing every entry record
pub const ENTRY_TERMINATOR: u16 = 0xFFFF;

/// Placeholder the tree uses for a missing extension or path
const EMPTY_COMPONENT: &str = " ";

/// Fixed part of an entry record
#[derive(Debug, Clone, BinRead)]
#[br(little)]
struct EntryRecord {
    crc: u32,
    preload_bytes: u16,
    archive_index: u16,
    entry_offset: u32,
    entry_length: u32,
    terminator: u16,
    #[br(count = preload_bytes)]
    preload: Vec<u8>,
}

/// Where an entry's payload lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryLocation {
    /// Stored in the directory file at an absolute offset
    Embedded {
        /// Absolute offset inside the directory file
        offset: u64,
    },
    /// Stored in a numbered part file
    Part {
        /// Part index (`<base>_<index>.vpk`)
        index: u16,
        /// Offset inside the part file
        offset: u64,
    },
}

/// A single file listed in the directory tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    /// File name without extension
    pub file_name: String,
    /// CRC32 of the payload as stored in the tree
    pub crc: u32,
    /// Leading bytes of the payload stored inline in the tree
    #[serde(skip)]
    pub preload: Vec<u8>,
    /// Raw archive index from the tree
    pub archive_index: u16,
    /// Raw payload offset from the tree
    pub offset: u32,
    /// Payload length, excluding preload bytes
    pub length: u32,
    /// Resolved payload location
    pub location: EntryLocation,
}

impl DirectoryEntry {
    /// Total size of the file (preload plus payload)
    pub fn total_size(&self) -> u64 {
        self.preload.len() as u64 + u64::from(self.length)
    }
}

/// All files sharing one extension and one path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directory {
    /// Extension without the dot, empty if none
    pub extension: String,
    /// Slash-separated directory path, empty for the root
    pub path: String,
    /// Files in tree order
    pub entries: Vec<DirectoryEntry>,
}

impl Directory {
    /// Full archive path of an entry in this directory
    pub fn entry_path(&self, entry: &DirectoryEntry) -> String {
        let mut full = String::new();
        if !self.path.is_empty() {
            full.push_str(&self.path);
            full.push('/');
        }
        full.push_str(&entry.file_name);
        if !self.extension.is_empty() {
            full.push('.');
            full.push_str(&self.extension);
        }
        full
    }
}

/// Decode the directory tree following `header`
///
/// `archive` provides the resolved parts so entry locations can be checked
/// against the files actually present.
pub(crate) fn read_tree<R: Read + Seek>(
    reader: &mut R,
    header: &ArchiveHeader,
    archive: &Archive,
) -> ArchiveResult<Vec<Directory>> {
    let tree_start = header.version().header_size();
    let tree_end = tree_start + u64::from(header.tree_size());
    let data_offset = header.data_offset();

    reader.seek(SeekFrom::Start(tree_start))?;
    debug!(
        "Reading directory tree: {} bytes at offset {}",
        header.tree_size(),
        tree_start
    );

    let mut directories = Vec::new();
    loop {
        let extension = read_component(reader, tree_end)?;
        if extension.is_empty() {
            break;
        }

        loop {
            let path = read_component(reader, tree_end)?;
            if path.is_empty() {
                break;
            }

            let mut directory = Directory {
                extension: normalize(&extension),
                path: normalize(&path),
                entries: Vec::new(),
            };

            loop {
                let file_name = read_component(reader, tree_end)?;
                if file_name.is_empty() {
                    break;
                }

                let record = EntryRecord::read(reader)?;
                check_bounds(reader, tree_end)?;
                if record.terminator != ENTRY_TERMINATOR {
                    return Err(ArchiveError::MalformedTree {
                        reason: format!(
                            "bad terminator {:#06x} after entry '{}'",
                            record.terminator, file_name
                        ),
                    });
                }

                let location = locate(&record, data_offset, archive);
                directory.entries.push(DirectoryEntry {
                    file_name,
                    crc: record.crc,
                    preload: record.preload,
                    archive_index: record.archive_index,
                    offset: record.entry_offset,
                    length: record.entry_length,
                    location,
                });
            }

            directories.push(directory);
        }
    }

    Ok(directories)
}

fn locate(record: &EntryRecord, data_offset: u64, archive: &Archive) -> EntryLocation {
    if record.archive_index == EMBEDDED_ARCHIVE_INDEX {
        return EntryLocation::Embedded {
            offset: data_offset + u64::from(record.entry_offset),
        };
    }

    if archive.is_multi_part() && archive.part(i32::from(record.archive_index)).is_none() {
        warn!(
            "Entry references missing archive part {}",
            record.archive_index
        );
    }

    EntryLocation::Part {
        index: record.archive_index,
        offset: u64::from(record.entry_offset),
    }
}

fn read_component<R: Read + Seek>(reader: &mut R, tree_end: u64) -> ArchiveResult<String> {
    let raw = NullString::read(reader)?;
    check_bounds(reader, tree_end)?;
    String::from_utf8(raw.0).map_err(|e| ArchiveError::MalformedTree {
        reason: format!("invalid UTF-8 in tree string: {e}"),
    })
}

fn check_bounds<R: Seek>(reader: &mut R, tree_end: u64) -> ArchiveResult<()> {
    let position = reader.stream_position()?;
    if position > tree_end {
        return Err(ArchiveError::MalformedTree {
            reason: format!("tree runs past its declared end ({position} > {tree_end})"),
        });
    }
    Ok(())
}

fn normalize(component: &str) -> String {
    if component == EMPTY_COMPONENT {
        String::new()
    } else {
        component.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::header::{HeaderV1, VPK_SIGNATURE};
    use crate::part::ArchivePart;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use test_utils::{FixtureEntry, VpkFixture};

    fn v1_header(tree_size: u32) -> ArchiveHeader {
        ArchiveHeader::V1(HeaderV1 {
            signature: VPK_SIGNATURE,
            version: 1,
            tree_size,
        })
    }

    #[test]
    fn test_read_tree_groups_entries() {
        let fixture = VpkFixture::v1()
            .with_entry(FixtureEntry::embedded("materials/brick", "wall", "vmt", b"hello"))
            .with_entry(FixtureEntry::embedded("materials/brick", "floor", "vmt", b"abc"))
            .with_entry(FixtureEntry::embedded("", "readme", "txt", b"x"));
        let data = fixture.build();
        let header = v1_header(fixture.tree_size());

        let directories = read_tree(&mut Cursor::new(&data), &header, &Archive::default())
            .expect("Tree should parse");

        assert_eq!(directories.len(), 2);
        let brick = &directories[0];
        assert_eq!(brick.extension, "vmt");
        assert_eq!(brick.path, "materials/brick");
        assert_eq!(brick.entries.len(), 2);
        assert_eq!(brick.entry_path(&brick.entries[0]), "materials/brick/wall.vmt");

        let root = &directories[1];
        assert_eq!(root.path, "");
        assert_eq!(root.entry_path(&root.entries[0]), "readme.txt");
    }

    #[test]
    fn test_embedded_locations_are_absolute() {
        let fixture = VpkFixture::v1()
            .with_entry(FixtureEntry::embedded("a", "one", "bin", b"1111"))
            .with_entry(FixtureEntry::embedded("a", "two", "bin", b"22"));
        let data = fixture.build();
        let header = v1_header(fixture.tree_size());

        let directories = read_tree(&mut Cursor::new(&data), &header, &Archive::default())
            .expect("Tree should parse");
        let entries = &directories[0].entries;

        let EntryLocation::Embedded { offset } = entries[1].location else {
            unreachable!("embedded entry expected");
        };
        let start = offset as usize;
        assert_eq!(&data[start..start + 2], b"22");
        assert_eq!(entries[1].total_size(), 2);
    }

    #[test]
    fn test_part_locations() {
        let fixture = VpkFixture::v1()
            .with_entry(FixtureEntry::in_part("sound", "boom", "wav", 3, 512, 1024))
            .with_entry(FixtureEntry::in_part("sound", "bang", "wav", 0, 0, 10).with_preload(b"RIFF"));
        let data = fixture.build();
        let header = v1_header(fixture.tree_size());

        let directories = read_tree(&mut Cursor::new(&data), &header, &Archive::default())
            .expect("Tree should parse");
        let entries = &directories[0].entries;

        assert_eq!(
            entries[0].location,
            EntryLocation::Part {
                index: 3,
                offset: 512
            }
        );
        assert_eq!(entries[1].preload, b"RIFF");
        assert_eq!(entries[1].total_size(), 14);
    }

    #[test]
    fn test_missing_part_is_still_recorded() {
        let fixture = VpkFixture::v1()
            .with_entry(FixtureEntry::in_part("sound", "boom", "wav", 7, 0, 1));
        let data = fixture.build();
        let header = v1_header(fixture.tree_size());

        let archive = Archive::with_parts(
            "pak01_dir.vpk",
            vec![
                ArchivePart::new(10, -1, "pak01_dir.vpk"),
                ArchivePart::new(10, 0, "pak01_000.vpk"),
            ],
        );
        let directories =
            read_tree(&mut Cursor::new(&data), &header, &archive).expect("Tree should parse");
        assert_eq!(directories[0].entries[0].archive_index, 7);
    }

    #[test]
    fn test_bad_terminator() {
        let fixture = VpkFixture::v1()
            .with_entry(FixtureEntry::embedded("a", "one", "bin", b"1").with_terminator(0x1234));
        let data = fixture.build();
        let header = v1_header(fixture.tree_size());

        let result = read_tree(&mut Cursor::new(&data), &header, &Archive::default());
        assert!(matches!(result, Err(ArchiveError::MalformedTree { .. })));
    }

    #[test]
    fn test_tree_size_too_small() {
        let fixture =
            VpkFixture::v1().with_entry(FixtureEntry::embedded("a", "one", "bin", b"1"));
        let data = fixture.build();
        let header = v1_header(4);

        let result = read_tree(&mut Cursor::new(&data), &header, &Archive::default());
        assert!(matches!(result, Err(ArchiveError::MalformedTree { .. })));
    }

    #[test]
    fn test_empty_tree() {
        let fixture = VpkFixture::v1();
        let data = fixture.build();
        let header = v1_header(fixture.tree_size());

        let directories = read_tree(&mut Cursor::new(&data), &header, &Archive::default())
            .expect("Tree should parse");
        assert!(directories.is_empty());
    }
}
