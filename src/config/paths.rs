//! Path management for AtSS
//!
//! Resolves the game's save directory and the backups root next to it.
//!
//! ## Path Resolution Order
//!
//! Saves directory:
//! 1. `ATSS_SAVES_DIR` environment variable (if set)
//! 2. Windows: `%USERPROFILE%\AppData\LocalLow\Eremite Games\Against the Storm`
//! 3. Elsewhere: the same directory inside the Steam Proton prefix
//!
//! Backups root:
//! 1. `ATSS_BACKUPS_DIR` environment variable (if set)
//! 2. `Against the Storm - AtSS Backups` next to the saves directory, so that
//!    backups are not picked up by Steam Cloud

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::error::AtssError;

/// Name of the backups root directory created next to the saves directory
pub const BACKUP_ROOT_DIRNAME: &str = "Against the Storm - AtSS Backups";

const SAVES_DIR_ENV: &str = "ATSS_SAVES_DIR";
const BACKUPS_DIR_ENV: &str = "ATSS_BACKUPS_DIR";

/// Steam app id of Against the Storm, used to locate the Proton prefix
#[cfg(not(windows))]
const STEAM_APP_ID: u32 = 1336490;

/// Manages all paths used by AtSS
#[derive(Debug, Clone)]
pub struct AtssPaths {
    /// Live save directory of the game
    saves_dir: PathBuf,
    /// Root holding every `Bak.*` backup directory
    backups_dir: PathBuf,
}

impl AtssPaths {
    /// Create a new AtssPaths instance from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, AtssError> {
        let saves_dir = match std::env::var_os(SAVES_DIR_ENV) {
            Some(custom) => PathBuf::from(custom),
            None => resolve_default_saves_dir()?,
        };

        Ok(match std::env::var_os(BACKUPS_DIR_ENV) {
            Some(custom) => Self::with_dirs(saves_dir, PathBuf::from(custom)),
            None => Self::from_saves_dir(saves_dir),
        })
    }

    /// Place the backups root next to the given saves directory
    pub fn from_saves_dir(saves_dir: PathBuf) -> Self {
        let backups_dir = match saves_dir.parent() {
            Some(parent) => parent.join(BACKUP_ROOT_DIRNAME),
            None => saves_dir.join(BACKUP_ROOT_DIRNAME),
        };
        Self {
            saves_dir,
            backups_dir,
        }
    }

    /// Create AtssPaths with explicit directories (useful for testing)
    pub fn with_dirs(saves_dir: PathBuf, backups_dir: PathBuf) -> Self {
        Self {
            saves_dir,
            backups_dir,
        }
    }

    /// Get the live save directory
    pub fn saves_dir(&self) -> &Path {
        &self.saves_dir
    }

    /// Get the backups root directory
    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Directory opened by the `open` command (the game's data directory)
    pub fn saves_parent_dir(&self) -> &Path {
        self.saves_dir.parent().unwrap_or(&self.saves_dir)
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.backups_dir.join("settings.json")
    }

    /// Get the path to the auto-backup lock file
    ///
    /// Keyed on the saves directory, so instances watching the same saves
    /// share it whatever their backups root.
    pub fn lock_file(&self) -> PathBuf {
        let name = self
            .saves_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.saves_parent_dir()
            .join(format!(".atss-autobackup-{}.lock", name))
    }

    /// Ensure the saves directory exists and create the backups root
    pub fn ensure_directories(&self) -> Result<(), AtssError> {
        match std::fs::metadata(&self.saves_dir) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(AtssError::Config(format!(
                    "Save directory '{}' is not a directory",
                    self.saves_dir.display()
                )))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AtssError::Config(format!(
                    "Save directory '{}' does not exist",
                    self.saves_dir.display()
                )))
            }
            Err(e) => {
                return Err(AtssError::Io(format!(
                    "Error checking save directory '{}': {}",
                    self.saves_dir.display(),
                    e
                )))
            }
        }

        std::fs::create_dir_all(&self.backups_dir).map_err(|e| {
            AtssError::Io(format!(
                "Failed to create backups directory '{}': {}",
                self.backups_dir.display(),
                e
            ))
        })?;

        Ok(())
    }
}

fn home_dir() -> Result<PathBuf, AtssError> {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or_else(|| AtssError::Config("Could not determine home directory".into()))
}

/// Resolve the default save directory path based on platform
#[cfg(windows)]
fn resolve_default_saves_dir() -> Result<PathBuf, AtssError> {
    Ok(home_dir()?
        .join("AppData")
        .join("LocalLow")
        .join("Eremite Games")
        .join("Against the Storm"))
}

/// Resolve the default save directory path based on platform
#[cfg(not(windows))]
fn resolve_default_saves_dir() -> Result<PathBuf, AtssError> {
    Ok(home_dir()?
        .join(".local/share/Steam/steamapps/compatdata")
        .join(STEAM_APP_ID.to_string())
        .join("pfx/drive_c/users/steamuser/AppData/LocalLow")
        .join("Eremite Games")
        .join("Against the Storm"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_backups_next_to_saves() {
        let temp_dir = TempDir::new().unwrap();
        let saves = temp_dir.path().join("Against the Storm");
        let paths = AtssPaths::from_saves_dir(saves.clone());

        assert_eq!(paths.saves_dir(), saves);
        assert_eq!(
            paths.backups_dir(),
            temp_dir.path().join(BACKUP_ROOT_DIRNAME)
        );
        assert_eq!(paths.saves_parent_dir(), temp_dir.path());
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();
        let saves = temp_dir.path().join("saves");

        env::set_var(SAVES_DIR_ENV, &saves);

        let paths = AtssPaths::new().unwrap();
        assert_eq!(paths.saves_dir(), saves);
        assert_eq!(
            paths.backups_dir(),
            temp_dir.path().join(BACKUP_ROOT_DIRNAME)
        );

        env::remove_var(SAVES_DIR_ENV);
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let saves = temp_dir.path().join("saves");
        std::fs::create_dir(&saves).unwrap();
        let paths = AtssPaths::from_saves_dir(saves);

        paths.ensure_directories().unwrap();

        assert!(paths.backups_dir().is_dir());
    }

    #[test]
    fn test_ensure_directories_requires_saves_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AtssPaths::from_saves_dir(temp_dir.path().join("missing"));

        let err = paths.ensure_directories().unwrap_err();
        assert!(matches!(err, AtssError::Config(_)));
        assert!(!paths.backups_dir().exists());
    }

    #[test]
    fn test_file_paths() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AtssPaths::with_dirs(
            temp_dir.path().join("saves"),
            temp_dir.path().join("backups"),
        );

        assert_eq!(
            paths.settings_file(),
            temp_dir.path().join("backups").join("settings.json")
        );
        assert_eq!(
            paths.lock_file(),
            temp_dir.path().join(".atss-autobackup-saves.lock")
        );
    }

    #[test]
    fn test_lock_file_shared_across_backups_roots() {
        let temp_dir = TempDir::new().unwrap();
        let saves = temp_dir.path().join("saves");
        let first = AtssPaths::with_dirs(saves.clone(), temp_dir.path().join("one"));
        let second = AtssPaths::with_dirs(saves, temp_dir.path().join("two"));
        let other = AtssPaths::with_dirs(
            temp_dir.path().join("other saves"),
            temp_dir.path().join("one"),
        );

        assert_eq!(first.lock_file(), second.lock_file());
        assert_ne!(first.lock_file(), other.lock_file());
    }
}
