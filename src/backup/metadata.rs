//! Backup metadata and directory naming
//!
//! Every backup is a directory under the backups root holding a copy of the
//! save files plus an `atss.json` sidecar with [`BackupMetadata`].

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Datelike, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::snapshot::SeasonId;

/// Prefix shared by every backup directory name
pub const BACKUP_DIR_PREFIX: &str = "Bak.";

/// strftime format of timestamped backup directory names
pub const BACKUP_DIRNAME_FORMAT: &str = "Bak.%Y-%m-%d_%H.%M.%S";

/// Reserved directory name of the pre-restore safety backup
pub const OVERWRITTEN_BACKUP_DIRNAME: &str = "Bak.overwritten";

/// Sidecar metadata file inside each backup directory
pub const METADATA_FILENAME: &str = "atss.json";

/// Metadata stored alongside each backup
///
/// Unset fields (`None` or empty) are filled in when the backup is created
/// or back-filled when it is read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackupMetadata {
    /// When the backup was created, truncated to whole seconds
    pub created_at: Option<DateTime<Local>>,
    /// Created by the auto-backup loop
    pub is_auto_save: bool,
    /// The singleton safety copy taken right before a restore
    pub is_overwritten: bool,
    /// Content digest of the save files
    pub hash: String,
    /// Free text from the user
    pub note: String,
    /// Game progress at the time of the backup
    pub season: Option<SeasonId>,
}

impl BackupMetadata {
    /// Metadata for a manual backup with an optional note
    pub fn with_note(note: impl Into<String>) -> Self {
        Self {
            note: note.into(),
            ..Self::default()
        }
    }

    /// Metadata for a backup taken by the auto-backup loop
    pub fn auto_save() -> Self {
        Self {
            is_auto_save: true,
            ..Self::default()
        }
    }

    /// Metadata for the safety copy taken before a restore
    pub fn overwritten() -> Self {
        Self {
            is_overwritten: true,
            ..Self::default()
        }
    }

    /// Drop timestamps that cannot be real creation times
    ///
    /// Zero timestamps written by older versions count as unset.
    pub(crate) fn normalize(&mut self) {
        if self.created_at.is_some_and(|t| t.year() <= 1) {
            self.created_at = None;
        }
    }
}

/// Directory name of a timestamped backup
pub fn backup_dirname(created_at: &DateTime<Local>) -> String {
    created_at.format(BACKUP_DIRNAME_FORMAT).to_string()
}

/// Parse the creation time encoded in a timestamped backup directory name
pub fn parse_backup_dirname(name: &str) -> Option<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(name, BACKUP_DIRNAME_FORMAT).ok()?;
    Local.from_local_datetime(&naive).earliest()
}

/// A backup directory and its metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backup {
    pub metadata: BackupMetadata,
    pub dir: PathBuf,
}

impl Backup {
    /// Directory name, used to refer to the backup on the command line
    pub fn name(&self) -> String {
        self.dir
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.dir.display().to_string())
    }

    /// Season of the backup, [`SeasonId::INVALID`] when unknown
    pub fn season(&self) -> SeasonId {
        self.metadata.season.unwrap_or(SeasonId::INVALID)
    }
}

impl fmt::Display for Backup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.metadata.is_overwritten {
            f.write_str("[overwritten] ")?;
        }
        match self.metadata.created_at {
            Some(created_at) => write!(f, "{}", created_at.format("%Y-%m-%d %H:%M:%S"))?,
            None => f.write_str("unknown time")?,
        }
        write!(f, " [{}]", self.season())?;
        if !self.metadata.note.is_empty() {
            write!(f, " {}", self.metadata.note)?;
        } else if self.metadata.is_auto_save {
            f.write_str(" auto backup")?;
        }
        Ok(())
    }
}
