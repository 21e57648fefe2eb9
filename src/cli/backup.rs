//! Backup CLI commands
//!
//! Implements the save, autosave, list, restore and delete commands.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::Local;
use clap::Subcommand;
use tracing::warn;

use crate::backup::{Backup, BackupMetadata, BackupStore, RestoreManager};
use crate::config::paths::AtssPaths;
use crate::config::settings::Settings;
use crate::error::{AtssError, AtssResult};
use crate::snapshot::snapshot_age;
use crate::watch::AutoBackup;

/// Backup commands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Save the current state
    Save {
        /// Note shown when choosing a saved state to restore
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Save current and future states automatically
    Autosave,

    /// List saved states, newest first
    List {
        /// Show detailed information
        #[arg(short, long)]
        detailed: bool,
    },

    /// Restore a previously saved state
    Restore {
        /// Backup directory name or path ('latest' for the most recent,
        /// 'overwritten' for the state before the last restore)
        backup: String,

        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Delete previously saved states
    Delete {
        /// Backup directory names or paths
        #[arg(required = true)]
        backups: Vec<String>,

        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a backup command
pub fn handle_backup_command(
    paths: &AtssPaths,
    settings: &Settings,
    cmd: BackupCommands,
) -> AtssResult<()> {
    let store = BackupStore::new(paths);

    match cmd {
        BackupCommands::Save { note } => {
            match snapshot_age(paths.saves_dir()) {
                Ok(age) => println!(
                    "Your current game save is from {} ago.",
                    format_duration(age.age)
                ),
                Err(e) => warn!("failed to determine the age of your current game save: {}", e),
            }
            println!(
                "If you haven't done so yet, \"Save and Quit\" to main menu first, \
                 which creates an up-to-date game save. You don't have to exit the game."
            );
            println!();

            let backup = store.create(BackupMetadata::with_note(note.unwrap_or_default()))?;
            println!("Backup created: {}", backup);
            println!("Location: {}", backup.dir.display());
        }

        BackupCommands::Autosave => run_autosave(paths, settings)?,

        BackupCommands::List { detailed } => {
            let backups = store.list()?;

            if backups.is_empty() {
                println!("No backups found.");
                println!("Create one with: atss save");
                return Ok(());
            }

            println!("Available Backups");
            println!("=================");
            println!();

            for (i, backup) in backups.iter().enumerate() {
                if detailed {
                    println!(
                        "{}. {}\n   Name: {}\n   Age: {}\n   Hash: {}\n",
                        i + 1,
                        backup,
                        backup.name(),
                        backup_age(backup),
                        backup.metadata.hash,
                    );
                } else {
                    println!("  {}. {} ({})", i + 1, backup, backup.name());
                }
            }

            println!();
            println!("Total: {} backup(s)", backups.len());
            if backups.iter().any(|b| b.metadata.is_overwritten) {
                println!(
                    "The backup marked as [overwritten] was auto created during your last restore."
                );
            }
        }

        BackupCommands::Restore { backup, force } => {
            let target = store.find(&backup)?;
            let restore_manager = RestoreManager::new(store, settings);

            println!("Backup Information");
            println!("==================");
            println!("Backup: {}", target);
            println!("Location: {}", target.dir.display());
            println!();

            if restore_manager.restart_required(&target) {
                println!(
                    "This backup changes the world map. The game has to be closed \
                     (quitting to main menu isn't enough) before restoring."
                );
            } else {
                println!(
                    "Please quit to main menu before restoring. \
                     The game doesn't need to be closed."
                );
            }

            if !force {
                println!();
                println!("WARNING: This will overwrite your current game save!");
                println!("To proceed, run again with --force flag:");
                println!("  atss restore {} --force", backup);
                return Ok(());
            }

            match restore_manager.restore(&target) {
                Ok(overwritten) => {
                    println!("Restore complete!");
                    println!("Previous state saved as: {}", overwritten.name());
                }
                Err(AtssError::GameRunning) => {
                    println!(
                        "You need to quit the game before performing this restore, \
                         or the changes won't take full effect."
                    );
                    println!(
                        "Please quit the game (quitting to main menu isn't enough) \
                         and try the restore again."
                    );
                    return Err(AtssError::GameRunning);
                }
                Err(e) => return Err(e),
            }
        }

        BackupCommands::Delete { backups, force } => {
            let mut targets: Vec<Backup> = Vec::new();
            for identifier in &backups {
                let backup = store.find(identifier)?;
                if backup.metadata.is_overwritten {
                    // Replaced on every restore anyway
                    println!("Skipping {}: it is the state before the last restore.", backup.name());
                    continue;
                }
                if !targets.iter().any(|t| t.dir == backup.dir) {
                    targets.push(backup);
                }
            }

            if targets.is_empty() {
                println!("Nothing to delete.");
                return Ok(());
            }

            println!("To be deleted:");
            for backup in &targets {
                println!("  {} ({})", backup, backup.name());
            }
            println!();

            if !force {
                println!("To delete these backups, run again with --force flag:");
                println!("  atss delete {} --force", backups.join(" "));
                return Ok(());
            }

            delete_backups(&store, &targets)?;
        }
    }

    Ok(())
}

/// Delete every target, failing if any of them could not be deleted
fn delete_backups(store: &BackupStore, targets: &[Backup]) -> AtssResult<()> {
    let mut deleted = 0;
    for backup in targets {
        // Failures are logged by the store
        if store.delete(backup).is_ok() {
            deleted += 1;
        }
    }
    println!("Deleted {} backup(s).", deleted);

    if deleted < targets.len() {
        return Err(AtssError::Io(format!(
            "Failed to delete {} of {} backup(s)",
            targets.len() - deleted,
            targets.len()
        )));
    }
    Ok(())
}

/// Run the auto-backup loop and print its events until interrupted
fn run_autosave(paths: &AtssPaths, settings: &Settings) -> AtssResult<()> {
    let auto = AutoBackup::new(paths, &settings.auto_backup);
    let (sink, events) = mpsc::channel();
    let worker = thread::spawn(move || auto.run(sink));

    println!(
        "Watching for changes to the game save, a backup is created automatically \
         a few seconds after each change."
    );
    println!("Please keep this window open. Press Ctrl+C to stop.");
    println!();

    // Ends once the loop drops its sender
    for event in events {
        println!("{}", event);
    }

    match worker.join() {
        Ok(Ok(())) => Ok(()),
        Ok(Err(AtssError::AlreadyRunning(_))) => {
            println!("Another instance of autosave is already running. Exiting.");
            Ok(())
        }
        Ok(Err(e)) => Err(e),
        Err(_) => Err(AtssError::Watch("auto-backup loop panicked".into())),
    }
}

/// Time since a backup was created
fn backup_age(backup: &Backup) -> String {
    match backup.metadata.created_at {
        Some(created_at) => {
            let age = Local::now()
                .signed_duration_since(created_at)
                .to_std()
                .unwrap_or_default();
            format!("{} ago", format_duration(age))
        }
        None => "unknown".to_string(),
    }
}

/// Format a duration in human-readable form
fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    let days = hours / 24;
    if days < 30 {
        return format!("{}d", days);
    }

    let months = days / 30;
    format!("{}mo", months)
}
