//! Configuration management CLI commands.
//!
//! Provides `config init`, `config path` and `config show`.

use std::path::PathBuf;

use clap::Subcommand;
use geedar::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Write a commented default configuration file if none exists
    Init {
        /// Overwrite an existing file with the defaults
        #[arg(long)]
        force: bool,
    },

    /// Show the configuration file path
    Path,

    /// Print the effective configuration
    Show,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init { force } => run_init(config_file_path(), force),
        ConfigCommands::Path => {
            println!("{}", config_file_path().display());
            Ok(())
        }
        ConfigCommands::Show => {
            let config = ConfigFile::load()?;
            print!("{}", config.to_ini_string());
            Ok(())
        }
    }
}

fn run_init(path: PathBuf, force: bool) -> Result<(), CliError> {
    if force && path.exists() {
        ConfigFile::default().save_to(&path)?;
        println!("Configuration reset to defaults: {}", path.display());
        return Ok(());
    }

    if ConfigFile::ensure_exists_at(&path)? {
        println!("Configuration written to {}", path.display());
    } else {
        println!("Configuration already exists at {}", path.display());
        println!("Use 'geedar config init --force' to reset it.");
    }
    Ok(())
}
