//! Backup system for AtSS
//!
//! Backups are copies of the live save files kept in timestamped directories
//! under the backups root, next to the game's save directory.
//!
//! # Architecture
//!
//! - `BackupStore`: Creates, lists, reads and deletes backups
//! - `RestoreManager`: Restores a backup behind a safety gate
//!
//! # Backup Format
//!
//! Each backup directory (`Bak.YYYY-MM-DD_hh.mm.ss`) holds the `*.save`
//! files and an `atss.json` sidecar with:
//! - `createdAt`: Timestamp when backup was created
//! - `isAutoSave`: Created by the auto-backup loop
//! - `isOverwritten`: The safety copy taken before the last restore
//! - `hash`: Content digest of the save files
//! - `note`: Free text
//! - `season`: Game progress at the time of the backup
//!
//! The safety copy always lives in `Bak.overwritten` and is replaced on
//! every restore.
//!
//! # Example
//!
//! ```rust,ignore
//! use atss::backup::{BackupMetadata, BackupStore, RestoreManager};
//! use atss::config::{paths::AtssPaths, settings::Settings};
//!
//! let paths = AtssPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let store = BackupStore::new(&paths);
//!
//! let backup = store.create(BackupMetadata::with_note("before the storm"))?;
//!
//! // Later, restore from backup
//! let restore_manager = RestoreManager::new(store, &settings);
//! let overwritten = restore_manager.restore(&backup)?;
//! println!("previous state kept in {}", overwritten.dir.display());
//! ```

mod manager;
mod metadata;
mod restore;

pub use manager::{BackupRead, BackupStore};
pub use metadata::{
    backup_dirname, parse_backup_dirname, Backup, BackupMetadata, BACKUP_DIRNAME_FORMAT,
    BACKUP_DIR_PREFIX, METADATA_FILENAME, OVERWRITTEN_BACKUP_DIRNAME,
};
pub use restore::{ProcessProbe, RestoreManager, SystemProcessProbe};
