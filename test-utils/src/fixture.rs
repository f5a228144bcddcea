//! Builders for synthetic VPK directory files and multi-part archive families

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// VPK directory file signature
pub const VPK_SIGNATURE: u32 = 0x55AA_1234;

/// Archive index of entries stored in the directory file
pub const EMBEDDED_ARCHIVE_INDEX: u16 = 0x7FFF;

/// A file listed in a fixture's directory tree
#[derive(Debug, Clone)]
pub struct FixtureEntry {
    path: String,
    name: String,
    extension: String,
    archive_index: u16,
    offset: u32,
    length: u32,
    preload: Vec<u8>,
    terminator: u16,
    data: Option<Vec<u8>>,
}

impl FixtureEntry {
    /// Entry whose payload is stored in the directory file after the tree
    pub fn embedded(path: &str, name: &str, extension: &str, data: &[u8]) -> Self {
        Self {
            path: path.to_string(),
            name: name.to_string(),
            extension: extension.to_string(),
            archive_index: EMBEDDED_ARCHIVE_INDEX,
            offset: 0,
            length: data.len() as u32,
            preload: Vec::new(),
            terminator: 0xFFFF,
            data: Some(data.to_vec()),
        }
    }

    /// Entry whose payload lives in numbered part `archive_index`
    pub fn in_part(
        path: &str,
        name: &str,
        extension: &str,
        archive_index: u16,
        offset: u32,
        length: u32,
    ) -> Self {
        Self {
            path: path.to_string(),
            name: name.to_string(),
            extension: extension.to_string(),
            archive_index,
            offset,
            length,
            preload: Vec::new(),
            terminator: 0xFFFF,
            data: None,
        }
    }

    /// Store `preload` inline in the tree
    pub fn with_preload(mut self, preload: &[u8]) -> Self {
        self.preload = preload.to_vec();
        self
    }

    /// Override the record terminator (normally `0xFFFF`)
    pub fn with_terminator(mut self, terminator: u16) -> Self {
        self.terminator = terminator;
        self
    }

    /// Archive path in `path/name.ext` form
    pub fn full_path(&self) -> String {
        let mut full = String::new();
        if !self.path.is_empty() {
            full.push_str(&self.path);
            full.push('/');
        }
        full.push_str(&self.name);
        if !self.extension.is_empty() {
            full.push('.');
            full.push_str(&self.extension);
        }
        full
    }
}

/// Builder for a VPK directory file image
#[derive(Debug, Clone)]
pub struct VpkFixture {
    v2_layout: bool,
    signature: u32,
    version_field: u32,
    entries: Vec<FixtureEntry>,
}

impl VpkFixture {
    /// Version 1 layout
    pub fn v1() -> Self {
        Self {
            v2_layout: false,
            signature: VPK_SIGNATURE,
            version_field: 1,
            entries: Vec::new(),
        }
    }

    /// Version 2 layout
    pub fn v2() -> Self {
        Self {
            v2_layout: true,
            signature: VPK_SIGNATURE,
            version_field: 2,
            entries: Vec::new(),
        }
    }

    /// Add an entry to the tree
    pub fn with_entry(mut self, entry: FixtureEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Write a different signature into the header
    pub fn with_signature(mut self, signature: u32) -> Self {
        self.signature = signature;
        self
    }

    /// Write a different version number into the header, keeping the layout
    pub fn with_version_field(mut self, version: u32) -> Self {
        self.version_field = version;
        self
    }

    /// Size of the fixed header for this layout
    pub fn header_size(&self) -> u32 {
        if self.v2_layout { 28 } else { 12 }
    }

    /// Size of the encoded tree
    pub fn tree_size(&self) -> u32 {
        self.tree_bytes().len() as u32
    }

    /// Entries in tree order: grouped by extension, then path, in first-seen order
    fn ordered(&self) -> Vec<&FixtureEntry> {
        let mut groups: Vec<(&str, Vec<(&str, Vec<&FixtureEntry>)>)> = Vec::new();
        for entry in &self.entries {
            let ext_pos = match groups.iter().position(|(ext, _)| *ext == entry.extension) {
                Some(pos) => pos,
                None => {
                    groups.push((entry.extension.as_str(), Vec::new()));
                    groups.len() - 1
                }
            };
            let paths = &mut groups[ext_pos].1;
            match paths.iter_mut().find(|(path, _)| *path == entry.path) {
                Some((_, files)) => files.push(entry),
                None => paths.push((entry.path.as_str(), vec![entry])),
            }
        }

        groups
            .into_iter()
            .flat_map(|(_, paths)| paths.into_iter().flat_map(|(_, files)| files))
            .collect()
    }

    /// Encode the directory tree
    pub fn tree_bytes(&self) -> Vec<u8> {
        let ordered = self.ordered();
        let mut tree = Vec::new();
        let mut data_offset = 0u32;
        let mut current_ext: Option<&str> = None;
        let mut current_path: Option<&str> = None;

        for entry in ordered {
            if current_ext != Some(entry.extension.as_str()) {
                if current_ext.is_some() {
                    // close file list, then path list
                    tree.push(0);
                    tree.push(0);
                }
                push_component(&mut tree, &entry.extension);
                push_component(&mut tree, &entry.path);
                current_ext = Some(entry.extension.as_str());
                current_path = Some(entry.path.as_str());
            } else if current_path != Some(entry.path.as_str()) {
                tree.push(0);
                push_component(&mut tree, &entry.path);
                current_path = Some(entry.path.as_str());
            }

            tree.extend_from_slice(entry.name.as_bytes());
            tree.push(0);

            let offset = match &entry.data {
                Some(data) => {
                    let offset = data_offset;
                    data_offset += data.len() as u32;
                    offset
                }
                None => entry.offset,
            };

            tree.extend_from_slice(&0u32.to_le_bytes());
            tree.extend_from_slice(&(entry.preload.len() as u16).to_le_bytes());
            tree.extend_from_slice(&entry.archive_index.to_le_bytes());
            tree.extend_from_slice(&offset.to_le_bytes());
            tree.extend_from_slice(&entry.length.to_le_bytes());
            tree.extend_from_slice(&entry.terminator.to_le_bytes());
            tree.extend_from_slice(&entry.preload);
        }

        if current_ext.is_some() {
            tree.push(0);
            tree.push(0);
        }
        tree.push(0);
        tree
    }

    /// Payloads of embedded entries, in tree order
    pub fn embedded_data(&self) -> Vec<u8> {
        self.ordered()
            .into_iter()
            .filter_map(|entry| entry.data.as_deref())
            .flatten()
            .copied()
            .collect()
    }

    /// Encode the complete directory file
    pub fn build(&self) -> Vec<u8> {
        let tree = self.tree_bytes();
        let data = self.embedded_data();

        let mut out = Vec::new();
        out.extend_from_slice(&self.signature.to_le_bytes());
        out.extend_from_slice(&self.version_field.to_le_bytes());
        out.extend_from_slice(&(tree.len() as u32).to_le_bytes());
        if self.v2_layout {
            out.extend_from_slice(&(data.len() as u32).to_le_bytes());
            out.extend_from_slice(&0u32.to_le_bytes());
            out.extend_from_slice(&0u32.to_le_bytes());
            out.extend_from_slice(&0u32.to_le_bytes());
        }
        out.extend_from_slice(&tree);
        out.extend_from_slice(&data);
        out
    }
}

fn push_component(tree: &mut Vec<u8>, component: &str) {
    if component.is_empty() {
        tree.push(b' ');
    } else {
        tree.extend_from_slice(component.as_bytes());
    }
    tree.push(0);
}

/// A temporary directory holding the files of one or more archives
#[derive(Debug)]
pub struct ArchiveFamily {
    dir: TempDir,
    base: String,
}

impl ArchiveFamily {
    /// Create an empty directory for archive `base`
    pub fn new(base: &str) -> io::Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
            base: base.to_string(),
        })
    }

    /// Directory containing the archive files
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the `<base>_dir.vpk` descriptor
    pub fn dir_file(&self) -> PathBuf {
        self.dir.path().join(format!("{}_dir.vpk", self.base))
    }

    /// Write the directory descriptor
    pub fn write_dir(&self, fixture: &VpkFixture) -> io::Result<PathBuf> {
        let path = self.dir_file();
        fs::write(&path, fixture.build())?;
        Ok(path)
    }

    /// Write numbered part `<base>_<index:03>.vpk` with `len` filler bytes
    pub fn write_part(&self, index: u16, len: usize) -> io::Result<PathBuf> {
        let name = format!("{}_{index:03}.vpk", self.base);
        self.write_file(&name, &vec![index as u8; len])
    }

    /// Write an arbitrary file next to the archive
    pub fn write_file(&self, name: &str, contents: &[u8]) -> io::Result<PathBuf> {
        let path = self.dir.path().join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }
}
