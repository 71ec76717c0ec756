//! HTTP opener backed by reqwest's blocking client.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use super::traits::{ByteStream, OpenError, Opener};
use crate::config::HttpConfig;

/// Opener that performs an HTTP(S) GET for each location.
///
/// The response body is handed back as a streaming reader, so large
/// resources are never buffered in full.
#[derive(Debug)]
pub struct HttpOpener {
    client: Client,
    timeout: Duration,
}

impl HttpOpener {
    /// Creates a new HttpOpener with default configuration.
    pub fn new() -> Result<Self, OpenError> {
        Self::with_config(&HttpConfig::default())
    }

    /// Creates a new HttpOpener with a custom timeout and user agent.
    pub fn with_config(config: &HttpConfig) -> Result<Self, OpenError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| OpenError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    /// Request timeout applied to every GET.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Opener for HttpOpener {
    fn open(&self, location: &str) -> Result<ByteStream, OpenError> {
        debug!(location = %location, "HTTP GET");

        let response = self.client.get(location).send().map_err(|e| {
            if e.is_timeout() {
                OpenError::Http(format!(
                    "request to {} timed out after {}s",
                    location,
                    self.timeout.as_secs()
                ))
            } else {
                OpenError::Http(format!("Request failed: {}", e))
            }
        })?;

        // Check HTTP status
        if !response.status().is_success() {
            return Err(OpenError::Http(format!(
                "HTTP {} from {}",
                response.status(),
                location
            )));
        }

        Ok(Box::new(response))
    }
}
