//! Shared fixtures for unit tests

use std::fs;
use std::path::Path;

use chrono::{DateTime, Local, TimeZone};
use tempfile::TempDir;

use crate::backup::BackupStore;
use crate::config::AtssPaths;
use crate::snapshot::{META_SAVE_FILE, PROFILES_FILE, SAVE_FILE, WORLD_SAVE_FILE};

/// A saves directory and backups root inside one temp dir
pub(crate) struct TestEnv {
    pub temp: TempDir,
    pub paths: AtssPaths,
}

impl TestEnv {
    /// Saves directory holding a complete snapshot (year 2, clearance)
    pub fn new() -> Self {
        let env = Self::empty();
        write_snapshot(env.paths.saves_dir(), 2, 1, "world-1");
        env
    }

    /// Saves directory without any save files
    pub fn empty() -> Self {
        let temp = TempDir::new().unwrap();
        let saves = temp.path().join("Against the Storm");
        fs::create_dir(&saves).unwrap();
        let paths = AtssPaths::from_saves_dir(saves);
        paths.ensure_directories().unwrap();
        Self { temp, paths }
    }

    pub fn store(&self) -> BackupStore {
        BackupStore::new(&self.paths)
    }

    pub fn write_live(&self, name: &str, contents: &str) {
        fs::write(self.paths.saves_dir().join(name), contents).unwrap();
    }

    pub fn read_live(&self, name: &str) -> String {
        fs::read_to_string(self.paths.saves_dir().join(name)).unwrap()
    }
}

/// Write the four save files of an active game into `dir`
pub(crate) fn write_snapshot(dir: &Path, year: i64, season: i64, world: &str) {
    fs::write(
        dir.join(META_SAVE_FILE),
        r#"{"gameplay": {"hasActiveGame": true}}"#,
    )
    .unwrap();
    fs::write(dir.join(PROFILES_FILE), r#"{"profiles": []}"#).unwrap();
    fs::write(
        dir.join(SAVE_FILE),
        format!(r#"{{"gameplay": {{"year": {}, "season": {}}}}}"#, year, season),
    )
    .unwrap();
    fs::write(dir.join(WORLD_SAVE_FILE), world).unwrap();
}

pub(crate) fn local_time(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(y, mo, d, h, mi, s).earliest().unwrap()
}
