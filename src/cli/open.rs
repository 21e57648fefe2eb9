//! Open the game's save location in the platform file manager

use std::process::Command;

use crate::config::paths::AtssPaths;
use crate::error::{AtssError, AtssResult};

#[cfg(windows)]
const FILE_MANAGER: &str = "explorer";
#[cfg(target_os = "macos")]
const FILE_MANAGER: &str = "open";
#[cfg(not(any(windows, target_os = "macos")))]
const FILE_MANAGER: &str = "xdg-open";

/// Handle the open command
pub fn handle_open_command(paths: &AtssPaths) -> AtssResult<()> {
    let dir = paths.saves_parent_dir();
    Command::new(FILE_MANAGER).arg(dir).spawn().map_err(|e| {
        AtssError::Io(format!(
            "Failed to open directory '{}' with {}: {}",
            dir.display(),
            FILE_MANAGER,
            e
        ))
    })?;
    println!("Opened {}", dir.display());
    Ok(())
}
