//! Discovery and loading of Valve VPK archives
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::uninlined_format_args)] // Backwards compatibility
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::needless_pass_by_value)] // Builder-style options
#![allow(clippy::return_self_not_must_use)] // Builder patterns
//! A VPK archive is either a single file or a `<base>_dir.vpk` directory
//! descriptor accompanied by numbered data parts (`<base>_000.vpk`,
//! `<base>_001.vpk`, ...). This crate finds the parts belonging to a
//! descriptor, reads and verifies the v1/v2 header, and decodes the
//! directory tree into [`Archive`].
//!
//! # Loading
//!
//! ```rust,no_run
//! use vpk_archive::{Archive, VpkVersion};
//!
//! let archive = Archive::open("hl2/hl2_textures_dir.vpk", VpkVersion::V2)?;
//! for part in archive.parts() {
//!     println!("{:>3} {:>12} {}", part.index(), part.size(), part.path().display());
//! }
//! if let Some((_, entry)) = archive.find("materials/brick/brickwall001a.vtf") {
//!     println!("{:?}", entry.location);
//! }
//! # Ok::<(), vpk_archive::ArchiveError>(())
//! ```
//!
//! # Options
//!
//! ```rust
//! use vpk_archive::{ArchiveLoader, LoadOptions, PartIndexPolicy};
//!
//! let loader = ArchiveLoader::new(
//!     LoadOptions::new().with_part_index_policy(PartIndexPolicy::Skip),
//! )?;
//! assert_eq!(loader.options().dir_suffix, "_dir.vpk");
//! # Ok::<(), vpk_archive::ArchiveError>(())
//! ```

#![warn(missing_docs)]

mod archive;
/// Load options for part discovery
pub mod config;
mod error;
/// Directory file headers
pub mod header;
mod loader;
mod part;
mod reader;
/// Directory tree model
pub mod tree;
mod version;

pub use archive::Archive;
pub use config::{LoadOptions, PartIndexPolicy};
pub use error::{ArchiveError, ArchiveResult};
pub use header::{ArchiveHeader, HeaderV1, HeaderV2, VPK_SIGNATURE};
pub use loader::ArchiveLoader;
pub use part::{ArchivePart, MAIN_PART_INDEX, PartResolver};
pub use reader::{ArchiveReader, ArchiveSource, ReaderV1, ReaderV2, VpkReader};
pub use tree::{Directory, DirectoryEntry, EntryLocation};
pub use version::VpkVersion;
