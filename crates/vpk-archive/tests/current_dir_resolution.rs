#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Resolution of a bare `_dir.vpk` file name against the working directory
//!
//! Kept in its own test binary because it changes the process working
//! directory.

use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use test_utils::{ArchiveFamily, VpkFixture};
use vpk_archive::{ArchivePart, PartResolver};

/// Restores the previous working directory on drop
struct CurrentDirGuard {
    previous: PathBuf,
}

impl CurrentDirGuard {
    fn enter(dir: &Path) -> Self {
        let previous = std::env::current_dir().expect("Failed to read current dir");
        std::env::set_current_dir(dir).expect("Failed to change current dir");
        Self { previous }
    }
}

impl Drop for CurrentDirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.previous);
    }
}

#[test]
fn bare_file_name_resolves_in_current_dir() {
    let family = ArchiveFamily::new("foo").expect("Failed to create family");
    family.write_part(0, 12).expect("Failed to write part");
    family
        .write_dir(&VpkFixture::v1())
        .expect("Failed to write dir file");

    let _guard = CurrentDirGuard::enter(family.path());
    let parts = PartResolver::default()
        .resolve(Path::new("foo_dir.vpk"))
        .expect("Resolve should succeed");

    let indices: Vec<i32> = parts.iter().map(ArchivePart::index).collect();
    assert_eq!(indices, vec![-1, 0]);
    assert_eq!(parts[0].path(), Path::new("foo_dir.vpk"));
    assert_eq!(parts[1].path(), Path::new("./foo_000.vpk"));
    assert_eq!(parts[1].size(), 12);
}
