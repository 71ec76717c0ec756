//! Configuration file handling.
//!
//! Settings live in an INI file, by default `~/.datapackage/config.ini`:
//!
//! ```ini
//! [http]
//! timeout = 30
//! user_agent = datapackage/0.3.0
//!
//! [logging]
//! level = info
//! file = /var/log/datapackage.log
//! ```
//!
//! A missing file yields the defaults. Unknown keys are ignored.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

const SECTION_HTTP: &str = "http";
const SECTION_LOGGING: &str = "logging";

/// Errors loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

/// HTTP opener settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            user_agent: format!("datapackage/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `datapackage=debug`.
    pub level: String,
    /// Optional log file; logs go to stderr only when unset.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

/// Default configuration file location.
pub fn config_file_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".datapackage")
        .join("config.ini")
}

impl ConfigFile {
    /// Load from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from a specific file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(section) = ini.section(Some(SECTION_HTTP)) {
            if let Some(value) = section.get("timeout") {
                config.http.timeout_secs =
                    value
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue {
                            key: "http.timeout".to_string(),
                            value: value.to_string(),
                        })?;
            }
            if let Some(value) = section.get("user_agent").filter(|v| !v.trim().is_empty()) {
                config.http.user_agent = value.trim().to_string();
            }
        }

        if let Some(section) = ini.section(Some(SECTION_LOGGING)) {
            if let Some(value) = section.get("level").filter(|v| !v.trim().is_empty()) {
                config.logging.level = value.trim().to_string();
            }
            config.logging.file = section
                .get("file")
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from);
        }

        Ok(config)
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        ini.with_section(Some(SECTION_HTTP))
            .set("timeout", self.http.timeout_secs.to_string())
            .set("user_agent", self.http.user_agent.as_str());

        let mut logging = ini.with_section(Some(SECTION_LOGGING));
        logging.set("level", self.logging.level.as_str());
        if let Some(file) = &self.logging.file {
            logging.set("file", file.to_string_lossy().into_owned());
        }
        ini
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to a specific file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        self.to_ini().write_to_file(path).map_err(write_err)
    }

    /// Flattened `section.key = value` pairs, for display.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("http.timeout", self.http.timeout_secs.to_string()),
            ("http.user_agent", self.http.user_agent.clone()),
            ("logging.level", self.logging.level.clone()),
            (
                "logging.file",
                self.logging
                    .file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ),
        ]
    }
}
