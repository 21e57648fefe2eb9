//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the backup library.

pub mod backup;
pub mod open;

pub use backup::{handle_backup_command, BackupCommands};
pub use open::handle_open_command;
