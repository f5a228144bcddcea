//! VPK format version selection and detection

use crate::error::{ArchiveError, ArchiveResult};
use crate::header::VPK_SIGNATURE;
use serde::{Deserialize, Serialize};
use std::io::{Read, Seek, SeekFrom};

/// Supported VPK directory file versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VpkVersion {
    /// Version 1 (Source 2007 era): 12-byte header, tree only
    V1,
    /// Version 2 (Source 2009+): 28-byte header with MD5 and signature sections
    V2,
}

impl VpkVersion {
    /// Detect the version from the header prefix of a directory file
    ///
    /// The reader position is restored afterwards.
    pub fn detect<R: Read + Seek>(reader: &mut R) -> ArchiveResult<Self> {
        let start_pos = reader.stream_position()?;

        let mut prefix = [0u8; 8];
        reader.read_exact(&mut prefix)?;
        reader.seek(SeekFrom::Start(start_pos))?;

        let signature = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);
        if signature != VPK_SIGNATURE {
            return Err(ArchiveError::InvalidHeader);
        }

        let version = u32::from_le_bytes([prefix[4], prefix[5], prefix[6], prefix[7]]);
        Self::try_from(version)
    }

    /// Size of the fixed header in bytes
    pub const fn header_size(self) -> u64 {
        match self {
            Self::V1 => 12,
            Self::V2 => 28,
        }
    }

    /// Convert to numeric representation
    pub const fn to_u32(self) -> u32 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
        }
    }

    /// Create from numeric representation
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::V1),
            2 => Some(Self::V2),
            _ => None,
        }
    }
}

impl TryFrom<u32> for VpkVersion {
    type Error = ArchiveError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_u32(value).ok_or(ArchiveError::UnsupportedVersion(value))
    }
}

impl std::fmt::Display for VpkVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V1 => write!(f, "V1"),
            Self::V2 => write!(f, "V2"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prefix(signature: u32, version: u32) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&signature.to_le_bytes());
        data.extend_from_slice(&version.to_le_bytes());
        data.extend_from_slice(&[0u8; 4]);
        data
    }

    #[test]
    fn test_detect_versions() {
        let mut cursor = Cursor::new(prefix(VPK_SIGNATURE, 1));
        assert_eq!(
            VpkVersion::detect(&mut cursor).expect("Test operation should succeed"),
            VpkVersion::V1
        );
        assert_eq!(cursor.position(), 0);

        let mut cursor = Cursor::new(prefix(VPK_SIGNATURE, 2));
        assert_eq!(
            VpkVersion::detect(&mut cursor).expect("Test operation should succeed"),
            VpkVersion::V2
        );
    }

    #[test]
    fn test_detect_rejects_unknown() {
        let mut cursor = Cursor::new(prefix(VPK_SIGNATURE, 3));
        assert!(matches!(
            VpkVersion::detect(&mut cursor),
            Err(ArchiveError::UnsupportedVersion(3))
        ));

        let mut cursor = Cursor::new(prefix(0xDEAD_BEEF, 1));
        assert!(matches!(
            VpkVersion::detect(&mut cursor),
            Err(ArchiveError::InvalidHeader)
        ));

        let mut cursor = Cursor::new(vec![0x34, 0x12]);
        assert!(matches!(
            VpkVersion::detect(&mut cursor),
            Err(ArchiveError::Io(_))
        ));
    }

    #[test]
    fn test_numeric_conversion() {
        for version in [VpkVersion::V1, VpkVersion::V2] {
            let restored = VpkVersion::try_from(version.to_u32())
                .expect("Test operation should succeed");
            assert_eq!(version, restored);
        }

        assert_eq!(VpkVersion::from_u32(0), None);
        assert!(matches!(
            VpkVersion::try_from(3),
            Err(ArchiveError::UnsupportedVersion(3))
        ));
    }

    #[test]
    fn test_header_size() {
        assert_eq!(VpkVersion::V1.header_size(), 12);
        assert_eq!(VpkVersion::V2.header_size(), 28);
    }
}
