//! Configuration module for AtSS
//!
//! This module provides configuration management including:
//! - Save directory and backups root resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::AtssPaths;
pub use settings::{AutoBackupSettings, Settings};
