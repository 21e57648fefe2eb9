//! AtSS - Against the Storm save scummer
//!
//! This library backs up and restores the save files of Against the Storm.
//! Backups are plain copies of the game's `*.save` files kept next to the
//! save directory, each with a small JSON sidecar describing it.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Path resolution and user settings
//! - `error`: Custom error types
//! - `storage`: File copy and JSON file helpers
//! - `snapshot`: Save file discovery, hashing and game progress
//! - `backup`: Backup store and restore safety gate
//! - `watch`: Debounced auto-backup loop
//! - `cli`: Command handlers for the `atss` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use atss::backup::{BackupMetadata, BackupStore};
//! use atss::config::paths::AtssPaths;
//!
//! let paths = AtssPaths::new()?;
//! paths.ensure_directories()?;
//! let backup = BackupStore::new(&paths).create(BackupMetadata::default())?;
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod snapshot;
pub mod storage;
pub mod watch;

#[cfg(test)]
mod testing;

pub use error::{AtssError, AtssResult};
