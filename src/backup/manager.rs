//! Backup store for AtSS
//!
//! Creates, enumerates, reads and deletes backup directories under the
//! backups root. Reading is tolerant of legacy backups: missing metadata is
//! reconstructed from the directory name, its modification time and the save
//! files themselves.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, SubsecRound};
use tracing::{info, warn};

use super::metadata::{
    backup_dirname, parse_backup_dirname, Backup, BackupMetadata, BACKUP_DIR_PREFIX,
    METADATA_FILENAME, OVERWRITTEN_BACKUP_DIRNAME,
};
use crate::config::paths::AtssPaths;
use crate::error::{AtssError, AtssResult};
use crate::snapshot::{find_save_files, hash_snapshot, read_save, warn_missing_expected};
use crate::storage::file_io::{copy_file, read_json_required, write_json_atomic};

/// Outcome of reading a backup directory without touching it
#[derive(Debug, Clone)]
pub struct BackupRead {
    /// The backup with every field that could be reconstructed filled in
    pub backup: Backup,
    /// The sidecar file was missing or could not be decoded
    pub metadata_load_failed: bool,
    /// Hash or season had to be back-filled
    pub metadata_incomplete: bool,
}

impl BackupRead {
    /// Whether the back-filled metadata should be written to the sidecar
    ///
    /// A sidecar that failed to load is never replaced by a reconstruction.
    pub fn needs_rewrite(&self) -> bool {
        self.metadata_incomplete && !self.metadata_load_failed
    }
}

/// Creates and manages backups of the live save directory
#[derive(Debug, Clone)]
pub struct BackupStore {
    /// Live save directory
    saves_dir: PathBuf,
    /// Root holding the backup directories
    backups_dir: PathBuf,
}

impl BackupStore {
    /// Create a new BackupStore
    pub fn new(paths: &AtssPaths) -> Self {
        Self {
            saves_dir: paths.saves_dir().to_path_buf(),
            backups_dir: paths.backups_dir().to_path_buf(),
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

    /// Back up the live save files
    ///
    /// Unset fields of `requested` are filled in: the creation time defaults to
    /// now, hash and season are computed from the live saves. Failing to
    /// compute hash or season, or to write the sidecar, is only logged.
    pub fn create(&self, requested: BackupMetadata) -> AtssResult<Backup> {
        let save_files = find_save_files(&self.saves_dir)?;
        warn_missing_expected(&save_files, &self.saves_dir);

        let mut metadata = requested;
        let created_at = metadata
            .created_at
            .unwrap_or_else(Local::now)
            .trunc_subsecs(0);
        metadata.created_at = Some(created_at);

        if metadata.season.is_none() {
            match read_save(&self.saves_dir) {
                Ok(save) => metadata.season = Some(save.season_id()),
                Err(e) => warn!("failed to classify current save: {}", e),
            }
        }

        if metadata.hash.is_empty() {
            match hash_snapshot(&self.saves_dir) {
                Ok(hash) => metadata.hash = hash,
                Err(e) => warn!("failed to hash save: {}", e),
            }
        }

        let dirname = if metadata.is_overwritten {
            OVERWRITTEN_BACKUP_DIRNAME.to_string()
        } else {
            backup_dirname(&created_at)
        };
        let dir = self.backups_dir.join(&dirname);

        fs::create_dir_all(&self.backups_dir).map_err(|e| {
            AtssError::Io(format!(
                "Failed to create backups directory '{}': {}",
                self.backups_dir.display(),
                e
            ))
        })?;

        if metadata.is_overwritten {
            match fs::remove_dir_all(&dir) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(AtssError::Io(format!(
                        "Failed to remove existing overwritten backup directory '{}': {}",
                        dir.display(),
                        e
                    )))
                }
            }
        }

        fs::create_dir(&dir).map_err(|e| {
            if e.kind() == io::ErrorKind::AlreadyExists {
                AtssError::Duplicate {
                    entity_type: "Backup",
                    identifier: dirname.clone(),
                }
            } else {
                AtssError::Io(format!(
                    "Failed to create backup directory '{}': {}",
                    dir.display(),
                    e
                ))
            }
        })?;

        for src in &save_files {
            let Some(name) = src.file_name() else {
                continue;
            };
            if let Err(e) = copy_file(src, dir.join(name)) {
                if let Err(cleanup) = fs::remove_dir_all(&dir) {
                    warn!(
                        "failed to clean up incomplete backup '{}': {}",
                        dir.display(),
                        cleanup
                    );
                }
                return Err(AtssError::Io(format!(
                    "Failed to copy save file '{}' to backup directory '{}': {}",
                    src.display(),
                    dir.display(),
                    e
                )));
            }
        }

        if let Err(e) = write_json_atomic(dir.join(METADATA_FILENAME), &metadata) {
            warn!("failed to write backup metadata: {}", e);
        }

        info!("created backup '{}'", dir.display());
        Ok(Backup { metadata, dir })
    }

    /// List all backups, newest first
    ///
    /// Directories that cannot be read as backups are skipped with a warning.
    /// Ties on creation time are ordered by directory path, descending.
    pub fn list(&self) -> AtssResult<Vec<Backup>> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.backups_dir).map_err(|e| {
            AtssError::Io(format!("Failed to read backups directory: {}", e))
        })?;

        let mut backups = Vec::new();
        for entry in entries {
            let Some(dir) = backup_dir_of(entry) else {
                continue;
            };

            match self.read(&dir) {
                Ok(backup) => backups.push(backup),
                Err(e) => warn!("skipping backup '{}': {}", dir.display(), e),
            }
        }

        backups.sort_by(|a, b| {
            b.metadata
                .created_at
                .cmp(&a.metadata.created_at)
                .then_with(|| b.dir.cmp(&a.dir))
        });

        Ok(backups)
    }

    /// Read a backup directory, persisting back-filled metadata when safe
    pub fn read(&self, dir: &Path) -> AtssResult<Backup> {
        let read = self.inspect(dir)?;

        if read.needs_rewrite() {
            let metadata_file = dir.join(METADATA_FILENAME);
            if let Err(e) = write_json_atomic(&metadata_file, &read.backup.metadata) {
                warn!(
                    "failed to write back metadata of backup '{}': {}",
                    dir.display(),
                    e
                );
            }
        }

        Ok(read.backup)
    }

    /// Reconstruct a backup from its directory without writing anything
    ///
    /// Metadata is taken from the sidecar file; a missing creation time falls
    /// back to the directory name, then to the directory's modification time.
    /// Missing hash and season are computed from the backed up save files.
    pub fn inspect(&self, dir: &Path) -> AtssResult<BackupRead> {
        let stat = fs::metadata(dir).map_err(|e| {
            AtssError::Io(format!(
                "Failed to stat backup directory '{}': {}",
                dir.display(),
                e
            ))
        })?;

        find_save_files(dir)?;

        let mut metadata_load_failed = false;
        let mut metadata_incomplete = false;

        let metadata_file = dir.join(METADATA_FILENAME);
        let mut metadata = match read_json_required::<BackupMetadata, _>(&metadata_file) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("failed to load backup metadata: {}", e);
                metadata_load_failed = true;
                BackupMetadata::default()
            }
        };
        metadata.normalize();

        if metadata.created_at.is_none() {
            let dirname = dir
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            if dirname == OVERWRITTEN_BACKUP_DIRNAME {
                metadata.is_overwritten = true;
            } else {
                metadata.created_at = parse_backup_dirname(&dirname);
                if metadata.created_at.is_none() {
                    warn!("unrecognized backup directory name '{}'", dirname);
                }
            }
        }

        if metadata.created_at.is_none() {
            match stat.modified() {
                Ok(modified) => {
                    metadata.created_at = Some(DateTime::<Local>::from(modified).trunc_subsecs(0))
                }
                Err(e) => warn!(
                    "failed to get modification time of '{}': {}",
                    dir.display(),
                    e
                ),
            }
        }

        if metadata.hash.is_empty() {
            match hash_snapshot(dir) {
                Ok(hash) => {
                    metadata.hash = hash;
                    metadata_incomplete = true;
                }
                Err(e) => warn!("failed to hash backup '{}': {}", dir.display(), e),
            }
        }

        if metadata.season.is_none() {
            match read_save(dir) {
                Ok(save) => {
                    metadata.season = Some(save.season_id());
                    metadata_incomplete = true;
                }
                Err(e) => warn!("failed to classify backup '{}': {}", dir.display(), e),
            }
        }

        Ok(BackupRead {
            backup: Backup {
                metadata,
                dir: dir.to_path_buf(),
            },
            metadata_load_failed,
            metadata_incomplete,
        })
    }

    /// Delete a backup directory and everything in it
    pub fn delete(&self, backup: &Backup) -> AtssResult<()> {
        fs::remove_dir_all(&backup.dir).map_err(|e| {
            tracing::error!("failed to delete backup '{}': {}", backup.dir.display(), e);
            AtssError::Io(format!(
                "Failed to delete backup '{}': {}",
                backup.dir.display(),
                e
            ))
        })?;

        info!("deleted backup '{}'", backup.dir.display());
        Ok(())
    }

    /// Get the most recent backup, ignoring the overwritten singleton
    pub fn latest(&self) -> AtssResult<Option<Backup>> {
        let backups = self.list()?;
        Ok(backups.into_iter().find(|b| !b.metadata.is_overwritten))
    }

    /// Resolve a backup by `latest`, `overwritten`, directory name or path
    pub fn find(&self, identifier: &str) -> AtssResult<Backup> {
        if identifier.eq_ignore_ascii_case("latest") {
            return self
                .latest()?
                .ok_or_else(|| AtssError::backup_not_found(identifier));
        }

        let dirname = if identifier.eq_ignore_ascii_case("overwritten") {
            OVERWRITTEN_BACKUP_DIRNAME
        } else {
            identifier
        };

        let in_root = self.backups_dir.join(dirname);
        if in_root.is_dir() {
            return self.read(&in_root);
        }

        let path = PathBuf::from(identifier);
        if path.is_dir() {
            return self.read(&path);
        }

        Err(AtssError::backup_not_found(identifier))
    }
}

/// Path of a `Bak.*` directory entry, `None` for anything else
///
/// Entries that cannot be read are logged and skipped.
fn backup_dir_of(entry: io::Result<fs::DirEntry>) -> Option<PathBuf> {
    let entry = match entry {
        Ok(entry) => entry,
        Err(e) => {
            warn!("skipping unreadable entry in backups directory: {}", e);
            return None;
        }
    };

    let is_backup_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false)
        && entry
            .file_name()
            .to_string_lossy()
            .starts_with(BACKUP_DIR_PREFIX);
    is_backup_dir.then(|| entry.path())
}
