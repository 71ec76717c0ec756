//! datapackage CLI - Command-line interface
//!
//! Inspect data packages and stream their typed rows.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use datapackage::config::config_file_path;

use commands::config::ConfigCommands;
use commands::rows::RowsArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "datapackage")]
#[command(about = "Inspect data packages and stream their typed rows", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (default: ~/.datapackage/config.ini)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show package metadata
    Info {
        /// Package directory or base URL
        uri: String,
    },

    /// List resources with their locations and field types
    Resources {
        /// Package directory or base URL
        uri: String,
    },

    /// Stream typed rows as JSON lines
    Rows {
        /// Package directory or base URL
        uri: String,

        /// Only stream this resource (default: all resources in order)
        #[arg(short, long)]
        resource: Option<String>,

        /// Stop after this many rows
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Inspect the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let Cli {
        config,
        verbose,
        command,
    } = cli;

    let start = |name: &str| -> Result<CliRunner, CliError> {
        let runner = CliRunner::new(config.as_deref(), verbose)?;
        runner.log_startup(name);
        Ok(runner)
    };

    match command {
        Commands::Info { uri } => commands::info::run(&start("info")?, &uri),
        Commands::Resources { uri } => commands::resources::run(&start("resources")?, &uri),
        Commands::Rows {
            uri,
            resource,
            limit,
        } => commands::rows::run(
            &start("rows")?,
            RowsArgs {
                uri,
                resource,
                limit,
            },
        ),
        Commands::Config(command) => {
            let path = config.clone().unwrap_or_else(config_file_path);
            commands::config::run(command, &path)
        }
    }
}
