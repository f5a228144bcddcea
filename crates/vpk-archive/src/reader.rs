//! Version-specific readers for VPK directory files
//!
//! [`ArchiveReader`] is the capability the loader drives. [`VpkReader`] is the
//! closed set of built-in implementations, one variant per format version.

use crate::archive::Archive;
use crate::error::ArchiveResult;
use crate::header::{ArchiveHeader, HeaderV1, HeaderV2};
use crate::tree::{self, Directory};
use crate::version::VpkVersion;
use binrw::BinRead;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::PathBuf;
use tracing::debug;

/// Where a directory file's bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveSource {
    /// A file on disk, opened on each read
    Path(PathBuf),
    /// A directory file already in memory
    Memory(Vec<u8>),
}

impl ArchiveSource {
    fn with_reader<T>(
        &self,
        f: impl FnOnce(&mut dyn ReadSeek) -> ArchiveResult<T>,
    ) -> ArchiveResult<T> {
        match self {
            Self::Path(path) => {
                let mut reader = BufReader::new(File::open(path)?);
                f(&mut reader)
            }
            Self::Memory(data) => f(&mut Cursor::new(data.as_slice())),
        }
    }
}

/// Object-safe `Read + Seek`
pub(crate) trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// Capability to decode a directory file
pub trait ArchiveReader {
    /// Read the fixed-layout header prefix
    fn read_header(&mut self) -> ArchiveResult<ArchiveHeader>;

    /// Decode the directory tree
    ///
    /// `archive` already carries the resolved parts of a multi-part archive.
    fn read_directories(&mut self, archive: &Archive) -> ArchiveResult<Vec<Directory>>;
}

/// Reader for version 1 directory files
#[derive(Debug, Clone)]
pub struct ReaderV1 {
    source: ArchiveSource,
    header: Option<HeaderV1>,
}

impl ReaderV1 {
    /// Create a reader over `source`
    pub fn new(source: ArchiveSource) -> Self {
        Self {
            source,
            header: None,
        }
    }

    fn header(&mut self) -> ArchiveResult<HeaderV1> {
        if let Some(header) = &self.header {
            return Ok(header.clone());
        }
        let header = self
            .source
            .with_reader(|mut reader| Ok(HeaderV1::read(&mut reader)?))?;
        self.header = Some(header.clone());
        Ok(header)
    }
}

impl ArchiveReader for ReaderV1 {
    fn read_header(&mut self) -> ArchiveResult<ArchiveHeader> {
        Ok(ArchiveHeader::V1(self.header()?))
    }

    fn read_directories(&mut self, archive: &Archive) -> ArchiveResult<Vec<Directory>> {
        let header = ArchiveHeader::V1(self.header()?);
        self.source
            .with_reader(|mut reader| tree::read_tree(&mut reader, &header, archive))
    }
}

/// Reader for version 2 directory files
#[derive(Debug, Clone)]
pub struct ReaderV2 {
    source: ArchiveSource,
    header: Option<HeaderV2>,
}

impl ReaderV2 {
    /// Create a reader over `source`
    pub fn new(source: ArchiveSource) -> Self {
        Self {
            source,
            header: None,
        }
    }

    fn header(&mut self) -> ArchiveResult<HeaderV2> {
        if let Some(header) = &self.header {
            return Ok(header.clone());
        }
        let header = self
            .source
            .with_reader(|mut reader| Ok(HeaderV2::read(&mut reader)?))?;
        debug!(
            "V2 sections: data={} archive_md5={} other_md5={} signature={}",
            header.file_data_section_size,
            header.archive_md5_section_size,
            header.other_md5_section_size,
            header.signature_section_size
        );
        self.header = Some(header.clone());
        Ok(header)
    }
}

impl ArchiveReader for ReaderV2 {
    fn read_header(&mut self) -> ArchiveResult<ArchiveHeader> {
        Ok(ArchiveHeader::V2(self.header()?))
    }

    fn read_directories(&mut self, archive: &Archive) -> ArchiveResult<Vec<Directory>> {
        let header = ArchiveHeader::V2(self.header()?);
        self.source
            .with_reader(|mut reader| tree::read_tree(&mut reader, &header, archive))
    }
}

/// Built-in reader selected by format version
#[derive(Debug, Clone)]
pub enum VpkReader {
    /// Version 1 reader
    V1(ReaderV1),
    /// Version 2 reader
    V2(ReaderV2),
}

impl VpkReader {
    /// Select the reader for `version`
    pub fn new(version: VpkVersion, source: ArchiveSource) -> Self {
        match version {
            VpkVersion::V1 => Self::V1(ReaderV1::new(source)),
            VpkVersion::V2 => Self::V2(ReaderV2::new(source)),
        }
    }

    /// Format version this reader decodes
    pub const fn version(&self) -> VpkVersion {
        match self {
            Self::V1(_) => VpkVersion::V1,
            Self::V2(_) => VpkVersion::V2,
        }
    }
}

impl ArchiveReader for VpkReader {
    fn read_header(&mut self) -> ArchiveResult<ArchiveHeader> {
        match self {
            Self::V1(reader) => reader.read_header(),
            Self::V2(reader) => reader.read_header(),
        }
    }

    fn read_directories(&mut self, archive: &Archive) -> ArchiveResult<Vec<Directory>> {
        match self {
            Self::V1(reader) => reader.read_directories(archive),
            Self::V2(reader) => reader.read_directories(archive),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ArchiveError;
    use test_utils::{FixtureEntry, VpkFixture};

    fn fixture() -> VpkFixture {
        VpkFixture::v2()
            .with_entry(FixtureEntry::embedded("scripts", "game", "txt", b"data"))
    }

    #[test]
    fn test_reader_selection() {
        let source = ArchiveSource::Memory(Vec::new());
        assert_eq!(
            VpkReader::new(VpkVersion::V1, source.clone()).version(),
            VpkVersion::V1
        );
        assert_eq!(
            VpkReader::new(VpkVersion::V2, source).version(),
            VpkVersion::V2
        );
    }

    #[test]
    fn test_v2_reader_from_memory() {
        let data = fixture().build();
        let mut reader = VpkReader::new(VpkVersion::V2, ArchiveSource::Memory(data));

        let header = reader.read_header().expect("Header should parse");
        assert!(header.verify());
        assert_eq!(header.tree_size(), fixture().tree_size());

        let directories = reader
            .read_directories(&Archive::default())
            .expect("Tree should parse");
        assert_eq!(directories.len(), 1);
        assert_eq!(directories[0].entries[0].file_name, "game");
    }

    #[test]
    fn test_v1_reader_from_path() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temporary directory");
        let path = temp_dir.path().join("single.vpk");
        let data = VpkFixture::v1()
            .with_entry(FixtureEntry::embedded("", "a", "txt", b"1"))
            .build();
        std::fs::write(&path, data).expect("Failed to write fixture");

        let mut reader = VpkReader::new(VpkVersion::V1, ArchiveSource::Path(path));
        assert!(reader.read_header().expect("Header should parse").verify());
        let directories = reader
            .read_directories(&Archive::default())
            .expect("Tree should parse");
        assert_eq!(directories[0].entries.len(), 1);
    }

    #[test]
    fn test_v2_file_through_v1_reader_fails_verify() {
        let mut reader = VpkReader::new(VpkVersion::V1, ArchiveSource::Memory(fixture().build()));
        assert!(!reader.read_header().expect("Header should parse").verify());
    }

    #[test]
    fn test_missing_file() {
        let mut reader = VpkReader::new(
            VpkVersion::V1,
            ArchiveSource::Path(PathBuf::from("/nonexistent/pak01_dir.vpk")),
        );
        assert!(matches!(reader.read_header(), Err(ArchiveError::Io(_))));
    }
}
