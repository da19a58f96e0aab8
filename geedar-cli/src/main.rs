//! GEEDaR CLI - Command-line interface
//!
//! This binary provides a command-line interface to the GEEDaR library.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::codes::CodesCommands;
use commands::config::ConfigCommands;
use commands::retrieve::RetrieveArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "geedar")]
#[command(version = geedar::VERSION)]
#[command(about = "Retrieve remote-sensing time series for sites and dates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Retrieve data for the sites and dates of a CSV file
    Retrieve(RetrieveArgs),

    /// List registries or explain processing codes
    Codes {
        #[command(subcommand)]
        command: CodesCommands,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result: Result<(), CliError> = match cli.command {
        Commands::Retrieve(args) => commands::retrieve::run(args).await,
        Commands::Codes { command } => commands::codes::run(command),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}
