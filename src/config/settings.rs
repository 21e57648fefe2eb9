//! User settings for AtSS
//!
//! Manages user preferences: the game executable to look for before a restore
//! and the auto-backup debounce timings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::paths::AtssPaths;
use crate::error::AtssError;

/// Auto-backup debounce settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoBackupSettings {
    /// Seconds without a save write before a backup is taken
    #[serde(default = "default_quiet_period_secs")]
    pub quiet_period_secs: u64,
    /// Upper bound in seconds on how long a burst of writes can delay a backup
    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: u64,
}

impl AutoBackupSettings {
    pub fn quiet_period(&self) -> Duration {
        Duration::from_secs(self.quiet_period_secs)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_secs)
    }
}

impl Default for AutoBackupSettings {
    fn default() -> Self {
        Self {
            quiet_period_secs: default_quiet_period_secs(),
            max_wait_secs: default_max_wait_secs(),
        }
    }
}

/// User settings for AtSS
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Executable name of the game, checked before restores
    #[serde(default = "default_game_executable")]
    pub game_executable: String,

    /// Auto-backup timings
    #[serde(default)]
    pub auto_backup: AutoBackupSettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_game_executable() -> String {
    "Against the Storm.exe".to_string()
}

fn default_quiet_period_secs() -> u64 {
    5
}

fn default_max_wait_secs() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            game_executable: default_game_executable(),
            auto_backup: AutoBackupSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &AtssPaths) -> Result<Self, AtssError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| AtssError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                AtssError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &AtssPaths) -> Result<(), AtssError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| AtssError::Config(format!("Failed to serialize settings: {}", e)))?;

        crate::storage::file_io::write_atomic(paths.settings_file(), contents.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_paths(temp_dir: &TempDir) -> AtssPaths {
        AtssPaths::with_dirs(
            temp_dir.path().join("saves"),
            temp_dir.path().join("backups"),
        )
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.game_executable, "Against the Storm.exe");
        assert_eq!(settings.auto_backup.quiet_period(), Duration::from_secs(5));
        assert_eq!(settings.auto_backup.max_wait(), Duration::from_secs(30));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = test_paths(&temp_dir);

        let mut settings = Settings::default();
        settings.game_executable = "Storm.exe".to_string();
        settings.auto_backup.quiet_period_secs = 2;

        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.game_executable, "Storm.exe");
        assert_eq!(loaded.auto_backup.quiet_period_secs, 2);
        assert_eq!(loaded.auto_backup.max_wait_secs, 30);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"auto_backup": {"max_wait_secs": 60}}"#).unwrap();
        assert_eq!(settings.schema_version, 1);
        assert_eq!(settings.game_executable, "Against the Storm.exe");
        assert_eq!(settings.auto_backup.quiet_period_secs, 5);
        assert_eq!(settings.auto_backup.max_wait_secs, 60);
    }

    #[test]
    fn test_invalid_settings_file() {
        let temp_dir = TempDir::new().unwrap();
        let paths = test_paths(&temp_dir);
        std::fs::create_dir_all(paths.backups_dir()).unwrap();
        std::fs::write(paths.settings_file(), "not json").unwrap();

        let err = Settings::load_or_create(&paths).unwrap_err();
        assert!(matches!(err, AtssError::Config(_)));
    }
}
