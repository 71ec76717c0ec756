//! CLI error type.

use std::fmt;
use std::io;

use datapackage::config::ConfigError;
use datapackage::logging::LoggingError;
use datapackage::PackageError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded or is invalid.
    Config(String),

    /// Logging could not be initialised.
    Logging(LoggingError),

    /// Loading the package or streaming its rows failed.
    Package(PackageError),

    /// Writing command output failed.
    Output(io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Logging(e) => write!(f, "Logging error: {}", e),
            CliError::Package(e) => write!(f, "{}", e),
            CliError::Output(e) => write!(f, "Failed to write output: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Logging(e) => Some(e),
            CliError::Package(e) => Some(e),
            CliError::Output(e) => Some(e),
            CliError::Config(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<PackageError> for CliError {
    fn from(e: PackageError) -> Self {
        CliError::Package(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Output(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_error_display_is_passed_through() {
        let err: CliError = PackageError::ResourceNotFound("cities".to_string()).into();
        assert_eq!(err.to_string(), "resource not found: 'cities'");
    }

    #[test]
    fn test_config_error_converts() {
        let err: CliError = ConfigError::InvalidValue {
            key: "http.timeout".to_string(),
            value: "soon".to_string(),
        }
        .into();
        assert!(matches!(err, CliError::Config(ref msg) if msg.contains("http.timeout")));
    }
}
