use anyhow::Result;
use clap::{Parser, Subcommand};

use atss::cli::{handle_backup_command, handle_open_command, BackupCommands};
use atss::config::{paths::AtssPaths, settings::Settings};

#[derive(Parser)]
#[command(
    name = "atss",
    version,
    about = "Against the Storm save scummer",
    long_about = "AtSS backs up and restores Against the Storm save files. \
                  Save the current state before a risky decision, go back to it \
                  later, or let autosave keep a backup of every game save."
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Backup(BackupCommands),

    /// Open the saves directory
    Open,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Initialize paths and settings
    let paths = AtssPaths::new()?;
    paths.ensure_directories()?;
    let settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Some(Commands::Backup(cmd)) => {
            handle_backup_command(&paths, &settings, cmd)?;
        }
        Some(Commands::Open) => {
            handle_open_command(&paths)?;
        }
        Some(Commands::Config) => {
            if !paths.settings_file().exists() {
                settings.save(&paths)?;
            }
            println!("AtSS Configuration");
            println!("==================");
            println!("Saves directory:   {}", paths.saves_dir().display());
            println!("Backups directory: {}", paths.backups_dir().display());
            println!("Settings file:     {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!("  Game executable: {}", settings.game_executable);
            println!(
                "  Autosave delay:  {}s after the last change, at most {}s",
                settings.auto_backup.quiet_period_secs, settings.auto_backup.max_wait_secs
            );
        }
        None => {
            println!("AtSS - Against the Storm save scummer");
            println!();
            println!("Run 'atss --help' for usage information.");
            println!("Run 'atss save' to back up the current game save.");
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"))
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
