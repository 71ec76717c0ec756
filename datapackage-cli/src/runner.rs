//! Shared setup for commands that load packages.

use std::path::{Path, PathBuf};

use datapackage::config::{config_file_path, ConfigFile};
use datapackage::logging::{init_logging, LoggingGuard};
use datapackage::{DataPackage, DefaultOpener};
use tracing::{debug, info};

use crate::error::CliError;

/// Log level used by `--verbose`.
const VERBOSE_LEVEL: &str = "debug";

/// Loads configuration, installs logging, and opens packages.
pub struct CliRunner {
    config: ConfigFile,
    config_path: PathBuf,
    _logging: LoggingGuard,
}

impl CliRunner {
    /// Load configuration from `config_path` (or the default location) and
    /// start logging.
    pub fn new(config_path: Option<&Path>, verbose: bool) -> Result<Self, CliError> {
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(config_file_path);
        let mut config = ConfigFile::load_from(&config_path)?;
        if verbose {
            config.logging.level = VERBOSE_LEVEL.to_string();
        }

        let logging = init_logging(&config.logging)?;

        Ok(Self {
            config,
            config_path,
            _logging: logging,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log the command being run.
    pub fn log_startup(&self, command: &str) {
        info!(
            command,
            version = env!("CARGO_PKG_VERSION"),
            "datapackage starting"
        );
        debug!(config = %self.config_path.display(), "Using configuration");
    }

    /// Open a package with the configured HTTP settings.
    pub fn open_package(&self, uri: &str) -> Result<DataPackage<DefaultOpener>, CliError> {
        Ok(DataPackage::open_with_config(uri, &self.config.http)?)
    }
}
