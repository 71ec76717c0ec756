//! Configuration CLI commands.
//!
//! Provides `config list` and `config path` for inspecting the
//! configuration file from the command line.

use std::io::Write;
use std::path::Path;

use clap::Subcommand;
use datapackage::config::ConfigFile;

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand against the file at `path`.
pub fn run(command: ConfigCommands, path: &Path) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match command {
        ConfigCommands::List => {
            let config = ConfigFile::load_from(path)?;
            write_list(&config, &mut out)
        }
        ConfigCommands::Path => {
            writeln!(out, "{}", path.display())?;
            Ok(())
        }
    }
}

/// List all configuration settings grouped by section.
pub fn write_list<W: Write>(config: &ConfigFile, out: &mut W) -> Result<(), CliError> {
    writeln!(out, "Configuration Settings")?;
    writeln!(out, "======================")?;

    let mut current_section = "";

    for (key, value) in config.entries() {
        let (section, name) = key.split_once('.').unwrap_or(("", key));

        // Print section header when section changes
        if section != current_section {
            writeln!(out)?;
            writeln!(out, "[{}]", section)?;
            current_section = section;
        }

        if value.is_empty() {
            writeln!(out, "  {} = (not set)", name)?;
        } else {
            writeln!(out, "  {} = {}", name, value)?;
        }
    }

    Ok(())
}
