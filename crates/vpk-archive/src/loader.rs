//! Archive load orchestration
//!
//! A load walks through these stages, failing terminally at any of them:
//!
//! ```text
//! Empty -> PartsResolved (multi-part only) -> HeaderRead -> Verified -> DirectoriesLoaded
//! ```
//!
//! The archive value is only handed out after the last stage, so a failed
//! load never exposes partial state.

use crate::archive::Archive;
use crate::config::LoadOptions;
use crate::error::{ArchiveError, ArchiveResult};
use crate::part::PartResolver;
use crate::reader::{ArchiveReader, ArchiveSource, VpkReader};
use crate::version::VpkVersion;
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;
use tracing::{debug, info, warn};

/// Loads archives from disk or memory
#[derive(Debug, Clone, Default)]
pub struct ArchiveLoader {
    resolver: PartResolver,
}

impl ArchiveLoader {
    /// Create a loader with validated options
    pub fn new(options: LoadOptions) -> ArchiveResult<Self> {
        options.validate()?;
        Ok(Self {
            resolver: PartResolver::new(options),
        })
    }

    /// Options used by this loader
    pub fn options(&self) -> &LoadOptions {
        self.resolver.options()
    }

    /// Load the archive at `path` with the reader for `version`
    pub fn load_path(&self, path: impl AsRef<Path>, version: VpkVersion) -> ArchiveResult<Archive> {
        let path = path.as_ref();
        let reader = VpkReader::new(version, ArchiveSource::Path(path.to_path_buf()));
        self.load_with_reader(Some(path), reader)
    }

    /// Load the archive at `path` with a numeric format version
    ///
    /// Unknown versions fail before the file system is touched.
    pub fn load_path_raw(&self, path: impl AsRef<Path>, version: u32) -> ArchiveResult<Archive> {
        let version = VpkVersion::try_from(version)?;
        self.load_path(path, version)
    }

    /// Load the archive at `path`, detecting the version from its header
    pub fn load_path_detected(&self, path: impl AsRef<Path>) -> ArchiveResult<Archive> {
        let path = path.as_ref();
        let version = VpkVersion::detect(&mut BufReader::new(File::open(path)?))?;
        debug!("Detected {} archive: {}", version, path.display());
        self.load_path(path, version)
    }

    /// Load an archive from an in-memory directory file
    ///
    /// There is no path to scan for siblings, so part resolution is skipped.
    pub fn load_bytes(&self, data: impl Into<Vec<u8>>, version: VpkVersion) -> ArchiveResult<Archive> {
        let reader = VpkReader::new(version, ArchiveSource::Memory(data.into()));
        self.load_with_reader(None, reader)
    }

    /// Load an archive from memory, detecting the version from its header
    pub fn load_bytes_detected(&self, data: impl Into<Vec<u8>>) -> ArchiveResult<Archive> {
        let data = data.into();
        let version = VpkVersion::detect(&mut Cursor::new(data.as_slice()))?;
        self.load_bytes(data, version)
    }

    /// Run the load stages with an arbitrary reader
    ///
    /// `path` drives multi-part detection and part resolution; pass `None`
    /// for sources without a file system location.
    pub fn load_with_reader<R: ArchiveReader>(
        &self,
        path: Option<&Path>,
        mut reader: R,
    ) -> ArchiveResult<Archive> {
        let mut archive = Archive::default();

        match path {
            Some(path) => {
                info!("Loading archive {}", path.display());
                archive.path = Some(path.to_path_buf());
                archive.is_multi_part = self.resolver.is_multi_part(path);
                if archive.is_multi_part {
                    archive.parts = self.resolver.resolve(path)?;
                    debug!("Resolved {} archive parts", archive.parts.len());
                }
            }
            None => info!("Loading archive from memory"),
        }

        let header = reader.read_header()?;
        debug!(
            "Read {} header: tree_size={}",
            header.version(),
            header.tree_size()
        );
        if !header.verify() {
            warn!("Archive header failed verification: {:?}", header);
            return Err(ArchiveError::InvalidHeader);
        }
        archive.header = Some(header);

        let directories = reader.read_directories(&archive)?;
        archive.directories.extend(directories);

        info!(
            "Loaded archive: {} directories, {} entries, {} parts",
            archive.directories.len(),
            archive.entry_count(),
            archive.parts.len()
        );
        Ok(archive)
    }
}
