//! Save-state inspection
//!
//! A snapshot is the set of `*.save` files found together in one directory:
//! the live save directory, or a backup directory holding a copy of it.
//!
//! - [`find_save_files`]: locate the files of a snapshot
//! - [`hash_snapshot`]: content digest used to recognise identical saves
//! - [`read_save`] / [`classify`]: derive the [`SeasonId`] of a snapshot
//! - [`snapshot_age`]: when the snapshot was last written

mod hash;
mod save;
mod season;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};

use crate::error::{AtssError, AtssResult};

pub use hash::hash_snapshot;
pub use save::{classify, read_save, CompositeSave, SettlementProgress};
pub use season::{SeasonId, SeasonPhase};

pub const META_SAVE_FILE: &str = "MetaSave.save";
pub const PROFILES_FILE: &str = "Profiles.save";
pub const SAVE_FILE: &str = "Save.save";
pub const WORLD_SAVE_FILE: &str = "WorldSave.save";

/// Files a complete snapshot consists of
pub const EXPECTED_SAVE_FILES: [&str; 4] =
    [META_SAVE_FILE, PROFILES_FILE, SAVE_FILE, WORLD_SAVE_FILE];

const SAVE_EXTENSION: &str = "save";

/// List the `*.save` files in `dir`, sorted by path
///
/// Fails with [`AtssError::SnapshotMissing`] when there are none.
pub fn find_save_files(dir: &Path) -> AtssResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        AtssError::Io(format!("Failed to read directory '{}': {}", dir.display(), e))
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == SAVE_EXTENSION))
        .collect();

    if files.is_empty() {
        return Err(AtssError::SnapshotMissing {
            dir: dir.to_path_buf(),
        });
    }

    files.sort();
    Ok(files)
}

/// Names from [`EXPECTED_SAVE_FILES`] absent from `files`
pub fn missing_expected_files(files: &[PathBuf]) -> Vec<&'static str> {
    EXPECTED_SAVE_FILES
        .iter()
        .copied()
        .filter(|expected| {
            !files
                .iter()
                .any(|f| f.file_name().is_some_and(|name| name == *expected))
        })
        .collect()
}

/// Log a warning for every expected save file missing from `files`
pub fn warn_missing_expected(files: &[PathBuf], dir: &Path) {
    for expected in missing_expected_files(files) {
        tracing::warn!(
            "expected save file '{}' not found in '{}'",
            expected,
            dir.display()
        );
    }
}

/// Last modification of a snapshot
#[derive(Debug, Clone, Copy)]
pub struct SaveAge {
    pub last_modified: DateTime<Local>,
    pub age: Duration,
}

/// Newest modification time among the save files in `dir`
pub fn snapshot_age(dir: &Path) -> AtssResult<SaveAge> {
    let files = find_save_files(dir)?;

    let mut last_modified = SystemTime::UNIX_EPOCH;
    for path in &files {
        let modified = fs::metadata(path)
            .and_then(|meta| meta.modified())
            .map_err(|e| {
                AtssError::Io(format!("Failed to stat save file '{}': {}", path.display(), e))
            })?;
        last_modified = last_modified.max(modified);
    }

    let age = SystemTime::now()
        .duration_since(last_modified)
        .map_err(|_| {
            AtssError::Validation(format!(
                "last modified time of save files is in the future, probably wrong: {}",
                DateTime::<Local>::from(last_modified)
            ))
        })?;

    Ok(SaveAge {
        last_modified: last_modified.into(),
        age,
    })
}
