//! Custom error types for AtSS
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for AtSS operations
#[derive(Error, Debug)]
pub enum AtssError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// A parsed save file lacks a required field
    #[error("Validation error: {0}")]
    Validation(String),

    /// No `.save` files in a directory that should hold a snapshot
    #[error("No save files found in '{}'", dir.display())]
    SnapshotMissing { dir: PathBuf },

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Restore refused because the game would need a restart
    #[error("Game is running, refusing to restore backup since the changes won't apply properly")]
    GameRunning,

    /// Another auto-backup instance holds the lease
    #[error("Another instance of auto-backup is already running: {0}")]
    AlreadyRunning(String),

    /// Filesystem watcher errors
    #[error("Watch error: {0}")]
    Watch(String),
}

impl AtssError {
    /// Create a "not found" error for backups
    pub fn backup_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Backup",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error is a deliberate refusal the user can act on
    pub fn is_safety_refusal(&self) -> bool {
        matches!(self, Self::GameRunning | Self::AlreadyRunning(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for AtssError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AtssError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<notify::Error> for AtssError {
    fn from(err: notify::Error) -> Self {
        Self::Watch(err.to_string())
    }
}

/// Result type alias for AtSS operations
pub type AtssResult<T> = Result<T, AtssError>;
