//! Test utilities for vpk-rs
//!
//! Provides builders for synthetic VPK archives and discovery of real
//! Source engine game data for optional tests.

mod fixture;

pub use fixture::{
    ArchiveFamily, EMBEDDED_ARCHIVE_INDEX, FixtureEntry, VPK_SIGNATURE, VpkFixture,
};

use std::path::{Path, PathBuf};

/// Environment variable pointing at a directory with real `*_dir.vpk` files
pub const VPK_DATA_ENV: &str = "VPK_TEST_DATA";

/// Attempts to locate a directory containing real VPK archives
pub fn find_vpk_data() -> Option<PathBuf> {
    // Strategy 1: Check environment variable
    if let Ok(path) = std::env::var(VPK_DATA_ENV) {
        let path = PathBuf::from(shellexpand::tilde(&path).to_string());
        if is_valid_vpk_data(&path) {
            return Some(path);
        }
    }

    // Strategy 2: Check common Steam library paths
    get_common_vpk_paths()
        .into_iter()
        .find(|path| is_valid_vpk_data(path))
}

/// Get common Steam game data paths
fn get_common_vpk_paths() -> Vec<PathBuf> {
    let steam_roots = if cfg!(windows) {
        vec![
            "C:\\Program Files (x86)\\Steam\\steamapps\\common",
            "C:\\Program Files\\Steam\\steamapps\\common",
        ]
    } else if cfg!(target_os = "macos") {
        vec!["~/Library/Application Support/Steam/steamapps/common"]
    } else {
        vec![
            "~/.steam/steam/steamapps/common",
            "~/.local/share/Steam/steamapps/common",
        ]
    };

    let games = ["Half-Life 2/hl2", "Portal/portal", "Team Fortress 2/tf"];

    steam_roots
        .into_iter()
        .map(|root| PathBuf::from(shellexpand::tilde(root).to_string()))
        .flat_map(|root| games.iter().map(move |game| root.join(game)))
        .collect()
}

/// Check whether a directory contains at least one `*_dir.vpk` file
pub fn is_valid_vpk_data(path: &Path) -> bool {
    if !path.is_dir() {
        return false;
    }
    first_dir_file(path).is_some()
}

/// Find the first `*_dir.vpk` file in a directory, by name
pub fn first_dir_file(path: &Path) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(path)
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with("_dir.vpk"))
        })
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

/// Print instructions for pointing tests at real game data
pub fn print_setup_instructions() {
    println!("VPK Data Setup Instructions:");
    println!("============================");
    println!();
    println!("To run tests that require real VPK archives, set an environment variable:");
    println!();
    println!("  {VPK_DATA_ENV} = /path/to/game/dir");
    println!();
    println!("The directory should contain at least one *_dir.vpk file, for example:");
    println!("  export {VPK_DATA_ENV}=\"$HOME/.steam/steam/steamapps/common/Half-Life 2/hl2\"");
}

/// Get a real VPK data directory or skip the test with a helpful message
#[macro_export]
macro_rules! require_vpk_data {
    () => {
        match $crate::find_vpk_data() {
            Some(path) => path,
            None => {
                println!("Skipping test - no VPK data found");
                $crate::print_setup_instructions();
                return;
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_validation() {
        // Invalid path
        assert!(!is_valid_vpk_data(&PathBuf::from("/nonexistent/path")));

        let temp_dir = tempfile::tempdir().unwrap();
        let temp_path = temp_dir.path();

        // Empty directory is not valid
        assert!(!is_valid_vpk_data(temp_path));

        // Only parts, no descriptor
        std::fs::write(temp_path.join("pak01_000.vpk"), b"").unwrap();
        assert!(!is_valid_vpk_data(temp_path));

        std::fs::write(temp_path.join("pak01_dir.vpk"), b"").unwrap();
        assert!(is_valid_vpk_data(temp_path));
        assert_eq!(
            first_dir_file(temp_path),
            Some(temp_path.join("pak01_dir.vpk"))
        );
    }
}
