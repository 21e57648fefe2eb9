//! Auto-backup loop
//!
//! Watches the saves directory and creates an auto backup after every
//! debounced burst of save writes.

use std::fmt;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use chrono::{DateTime, Local};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tracing::{error, info, warn};

use super::debounce::{drive, Debouncer};
use super::lease::SingletonLease;
use crate::backup::{Backup, BackupMetadata, BackupStore};
use crate::config::paths::AtssPaths;
use crate::config::settings::AutoBackupSettings;
use crate::error::{AtssError, AtssResult};

/// Outcome of one auto-backup attempt
#[derive(Debug, Clone)]
pub enum AutoBackupEvent {
    Created(Backup),
    Failed { at: DateTime<Local>, error: String },
}

impl fmt::Display for AutoBackupEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created(backup) => write!(f, "created backup: {}", backup),
            Self::Failed { at, error } => write!(
                f,
                "[{}] failed to create auto backup: {}",
                at.format("%Y-%m-%d %H:%M:%S"),
                error
            ),
        }
    }
}

/// Watches the saves directory and backs up after each change
pub struct AutoBackup {
    store: BackupStore,
    lock_file: PathBuf,
    quiet_period: Duration,
    max_wait: Duration,
}

impl AutoBackup {
    pub fn new(paths: &AtssPaths, settings: &AutoBackupSettings) -> Self {
        Self {
            store: BackupStore::new(paths),
            lock_file: paths.lock_file(),
            quiet_period: settings.quiet_period(),
            max_wait: settings.max_wait(),
        }
    }

    /// Run until the process exits
    ///
    /// # Errors
    ///
    /// - [`AtssError::AlreadyRunning`] if another instance holds the lease
    /// - [`AtssError::Watch`] if the saves directory cannot be watched
    pub fn run(&self, sink: Sender<AutoBackupEvent>) -> AtssResult<()> {
        let _lease = match SingletonLease::acquire(&self.lock_file) {
            Ok(lease) => Some(lease),
            Err(e @ AtssError::AlreadyRunning(_)) => return Err(e),
            Err(e) => {
                warn!(
                    "cannot determine if auto-backup is already running: {}",
                    e
                );
                None
            }
        };

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            match res {
                Ok(event) if is_save_write(&event) => {
                    let _ = tx.send(());
                }
                Ok(_) => {}
                Err(e) => error!("filesystem watcher error: {}", e),
            }
        })?;

        let saves_dir = self.store.saves_dir();
        watcher
            .watch(saves_dir, RecursiveMode::NonRecursive)
            .map_err(|e| {
                AtssError::Watch(format!(
                    "failed to watch saves directory '{}': {}",
                    saves_dir.display(),
                    e
                ))
            })?;
        info!("watching '{}' for save changes", saves_dir.display());

        self.run_with_signals(rx, sink);
        Ok(())
    }

    /// Back up once, then after every debounced burst on `signals`
    ///
    /// Returns once `signals` disconnects.
    pub fn run_with_signals<T>(&self, signals: Receiver<T>, sink: Sender<AutoBackupEvent>) {
        self.backup_once(&sink);

        let mut debouncer = Debouncer::new(self.quiet_period, self.max_wait);
        drive(&mut debouncer, &signals, || self.backup_once(&sink));
    }

    fn backup_once(&self, sink: &Sender<AutoBackupEvent>) {
        let event = match self.store.create(BackupMetadata::auto_save()) {
            Ok(backup) => {
                info!("created auto backup '{}'", backup.dir.display());
                AutoBackupEvent::Created(backup)
            }
            Err(e) => {
                error!("failed to create auto backup: {}", e);
                AutoBackupEvent::Failed {
                    at: Local::now(),
                    error: e.to_string(),
                }
            }
        };
        // Nobody listening is fine
        let _ = sink.send(event);
    }
}

fn is_save_write(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any)
    )
}
