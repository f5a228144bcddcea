//! VPK directory file headers
//!
//! Both versions start with the same 12-byte prefix (signature, version,
//! tree size). Version 2 appends the sizes of the embedded data, MD5 and
//! signature sections. All fields are little-endian.

use crate::version::VpkVersion;
use binrw::BinRead;
use serde::Serialize;

/// VPK directory file signature
pub const VPK_SIGNATURE: u32 = 0x55AA_1234;

/// Version 1 header (12 bytes)
#[derive(Debug, Clone, PartialEq, Eq, BinRead, Serialize)]
#[br(little)]
pub struct HeaderV1 {
    /// File signature, must be `VPK_SIGNATURE`
    pub signature: u32,
    /// Format version, must be 1
    pub version: u32,
    /// Size of the directory tree following the header
    pub tree_size: u32,
}

/// Version 2 header (28 bytes)
#[derive(Debug, Clone, PartialEq, Eq, BinRead, Serialize)]
#[br(little)]
pub struct HeaderV2 {
    /// File signature, must be `VPK_SIGNATURE`
    pub signature: u32,
    /// Format version, must be 2
    pub version: u32,
    /// Size of the directory tree following the header
    pub tree_size: u32,
    /// Size of file data stored in the directory file after the tree
    pub file_data_section_size: u32,
    /// Size of the archive MD5 section
    pub archive_md5_section_size: u32,
    /// Size of the other MD5 section
    pub other_md5_section_size: u32,
    /// Size of the signature section
    pub signature_section_size: u32,
}

/// Header read by a version-specific reader
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ArchiveHeader {
    /// Version 1 header
    V1(HeaderV1),
    /// Version 2 header
    V2(HeaderV2),
}

impl ArchiveHeader {
    /// Structural sanity check of the header
    ///
    /// The signature must match and the stored version must match the
    /// reader that produced the header.
    pub fn verify(&self) -> bool {
        match self {
            Self::V1(header) => header.signature == VPK_SIGNATURE && header.version == 1,
            Self::V2(header) => header.signature == VPK_SIGNATURE && header.version == 2,
        }
    }

    /// Format version of the reader that produced this header
    pub const fn version(&self) -> VpkVersion {
        match self {
            Self::V1(_) => VpkVersion::V1,
            Self::V2(_) => VpkVersion::V2,
        }
    }

    /// Size of the directory tree in bytes
    pub const fn tree_size(&self) -> u32 {
        match self {
            Self::V1(header) => header.tree_size,
            Self::V2(header) => header.tree_size,
        }
    }

    /// Offset of the first byte after the tree
    ///
    /// Entries stored in the directory file (`archive_index == 0x7FFF`) are
    /// relative to this offset.
    pub const fn data_offset(&self) -> u64 {
        self.version().header_size() + self.tree_size() as u64
    }
}
