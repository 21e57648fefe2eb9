//! Backup restoration for AtSS
//!
//! Restoring overwrites the live save files, so it is gated:
//!
//! 1. If `WorldSave.save` differs between the live saves and the backup, the
//!    game has to be restarted to pick up the change. A restore that needs a
//!    restart is refused while the game is running.
//! 2. The live state is always backed up to the overwritten singleton first.
//!    If that fails nothing is overwritten.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::manager::BackupStore;
use super::metadata::{Backup, BackupMetadata, OVERWRITTEN_BACKUP_DIRNAME};
use crate::config::settings::Settings;
use crate::error::{AtssError, AtssResult};
use crate::snapshot::{find_save_files, warn_missing_expected, WORLD_SAVE_FILE};
use crate::storage::file_io::copy_file;

/// Staging directory used when restoring the overwritten singleton itself
const RESTORE_STAGING_DIRNAME: &str = ".restore-staging";

/// Answers whether a process is currently running
pub trait ProcessProbe {
    fn is_running(&self, executable: &str) -> AtssResult<bool>;
}

/// [`ProcessProbe`] backed by the system process table
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessProbe;

impl ProcessProbe for SystemProcessProbe {
    fn is_running(&self, executable: &str) -> AtssResult<bool> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(AtssError::Config(
                "listing processes is not supported on this system".into(),
            ));
        }

        let system = sysinfo::System::new_all();
        let running = system.processes().values().any(|process| {
            process.name() == executable
                || process
                    .exe()
                    .and_then(|exe| exe.file_name())
                    .is_some_and(|name| name == executable)
        });
        Ok(running)
    }
}

/// Handles restoring from backups
pub struct RestoreManager {
    store: BackupStore,
    game_executable: String,
    probe: Box<dyn ProcessProbe>,
}

impl RestoreManager {
    /// Create a new RestoreManager checking the system process table
    pub fn new(store: BackupStore, settings: &Settings) -> Self {
        Self::with_probe(
            store,
            settings.game_executable.clone(),
            Box::new(SystemProcessProbe),
        )
    }

    /// Create a RestoreManager with a custom process check
    pub fn with_probe(
        store: BackupStore,
        game_executable: impl Into<String>,
        probe: Box<dyn ProcessProbe>,
    ) -> Self {
        Self {
            store,
            game_executable: game_executable.into(),
            probe,
        }
    }

    /// Whether restoring `backup` changes the world save
    ///
    /// An unreadable world save on either side counts as a change.
    pub fn restart_required(&self, backup: &Backup) -> bool {
        let current_path = self.store.saves_dir().join(WORLD_SAVE_FILE);
        let backup_path = backup.dir.join(WORLD_SAVE_FILE);

        let current = fs::read(&current_path)
            .map_err(|e| warn!("failed to read {}: {}", current_path.display(), e))
            .ok();
        let restored = fs::read(&backup_path)
            .map_err(|e| warn!("failed to read {}: {}", backup_path.display(), e))
            .ok();

        match (current, restored) {
            (Some(current), Some(restored)) => current != restored,
            _ => true,
        }
    }

    /// Restore `backup` over the live save files
    ///
    /// Returns the overwritten singleton holding the state before the restore.
    ///
    /// # Errors
    ///
    /// - [`AtssError::SnapshotMissing`] if the backup has no save files
    /// - [`AtssError::GameRunning`] if a restart is required and the game runs
    /// - [`AtssError::Io`] if the live state cannot be backed up first, or a
    ///   file cannot be copied
    pub fn restore(&self, backup: &Backup) -> AtssResult<Backup> {
        info!("restoring backup '{}'", backup.dir.display());

        let save_files = find_save_files(&backup.dir)?;
        warn_missing_expected(&save_files, &backup.dir);

        if self.restart_required(backup) {
            match self.probe.is_running(&self.game_executable) {
                Ok(true) => return Err(AtssError::GameRunning),
                Ok(false) => {}
                Err(e) => warn!("failed to check if game is running, assuming it's not: {}", e),
            }
        }

        // The safety copy below replaces the singleton, so restoring the
        // singleton itself has to read from a staged copy.
        let staging = if self.is_overwritten_singleton(backup) {
            Some(self.stage(&save_files)?)
        } else {
            None
        };
        let source_files = match &staging {
            Some(dir) => find_save_files(dir)?,
            None => save_files,
        };

        info!("creating auto backup of current state before overwriting");
        let auto_backup = match self.store.create(BackupMetadata::overwritten()) {
            Ok(auto_backup) => auto_backup,
            Err(e) => {
                self.discard_staging(staging.as_deref());
                return Err(AtssError::Io(format!(
                    "Failed to create auto backup of current state, refusing to overwrite: {}",
                    e
                )));
            }
        };
        info!("created auto backup '{}' of current state", auto_backup.dir.display());

        let copied = self.copy_into_saves(&source_files);
        self.discard_staging(staging.as_deref());
        copied?;

        info!("restored backup '{}'", backup.dir.display());
        Ok(auto_backup)
    }

    fn copy_into_saves(&self, files: &[PathBuf]) -> AtssResult<()> {
        let saves_dir = self.store.saves_dir();
        for src in files {
            let Some(name) = src.file_name() else {
                continue;
            };
            copy_file(src, saves_dir.join(name)).map_err(|e| {
                AtssError::Io(format!(
                    "Failed to copy save file '{}' to save directory '{}': {}",
                    src.display(),
                    saves_dir.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    fn is_overwritten_singleton(&self, backup: &Backup) -> bool {
        backup.metadata.is_overwritten
            || backup.dir == self.store.backups_dir().join(OVERWRITTEN_BACKUP_DIRNAME)
    }

    fn stage(&self, files: &[PathBuf]) -> AtssResult<PathBuf> {
        let staging = self.store.backups_dir().join(RESTORE_STAGING_DIRNAME);
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir(&staging)?;
        for src in files {
            let Some(name) = src.file_name() else {
                continue;
            };
            if let Err(e) = copy_file(src, staging.join(name)) {
                self.discard_staging(Some(&staging));
                return Err(e);
            }
        }
        Ok(staging)
    }

    fn discard_staging(&self, staging: Option<&Path>) {
        if let Some(dir) = staging {
            if let Err(e) = fs::remove_dir_all(dir) {
                warn!("failed to remove staging directory '{}': {}", dir.display(), e);
            }
        }
    }
}
