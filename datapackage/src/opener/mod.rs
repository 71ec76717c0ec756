//! Byte-stream openers for package descriptors and resources.
//!
//! An opener turns an absolute location (URL or filesystem path) into a
//! readable byte stream. The row streaming engine never touches the network
//! or filesystem directly; it always goes through an [`Opener`], so the
//! source of bytes can be swapped without changing the core.
//!
//! # Available Openers
//!
//! - [`DefaultOpener`]: HTTP(S) for http/https URLs, filesystem for paths
//! - [`HttpOpener`]: blocking HTTP GET with a streamed response body
//! - [`FileOpener`]: local files
//! - [`GzipOpener`]: decorator that inflates `.gz` locations on the fly
//! - [`MemoryOpener`]: in-memory locations, useful for embedding and tests
//!
//! Any closure `Fn(&str) -> io::Result<Box<dyn Read + Send>>` is also an opener.
//!
//! # Example
//!
//! ```ignore
//! use datapackage::opener::{GzipOpener, FileOpener, Opener};
//!
//! let opener = GzipOpener::new(FileOpener::new());
//! let reader = opener.open("/data/pkg/cities.csv.gz")?;
//! ```

mod file;
mod gzip;
mod http;
mod memory;
mod traits;

pub use file::FileOpener;
pub use gzip::GzipOpener;
pub use http::HttpOpener;
pub use memory::MemoryOpener;
pub use traits::{ByteStream, OpenError, Opener};

use reqwest::Url;

use crate::config::HttpConfig;
use crate::location::is_url;

/// URL schemes [`HttpOpener`] can fetch.
const HTTP_SCHEMES: &[&str] = &["http", "https"];

/// Opener used when the caller does not supply one.
///
/// URLs with an `http` or `https` scheme are fetched with [`HttpOpener`].
/// Other network URLs (`ftp://`) are rejected with
/// [`OpenError::UnsupportedScheme`]; any other location is treated as a
/// filesystem path.
#[derive(Debug)]
pub struct DefaultOpener {
    http: HttpOpener,
    file: FileOpener,
}

impl DefaultOpener {
    /// Create a default opener with default HTTP settings.
    pub fn new() -> Result<Self, OpenError> {
        Self::with_config(&HttpConfig::default())
    }

    /// Create a default opener with the given HTTP settings.
    pub fn with_config(config: &HttpConfig) -> Result<Self, OpenError> {
        Ok(Self {
            http: HttpOpener::with_config(config)?,
            file: FileOpener::new(),
        })
    }
}

impl Opener for DefaultOpener {
    fn open(&self, location: &str) -> Result<ByteStream, OpenError> {
        if !is_url(location) {
            return self.file.open(location);
        }

        match Url::parse(location) {
            Ok(url) if HTTP_SCHEMES.contains(&url.scheme()) => self.http.open(location),
            Ok(url) => Err(OpenError::UnsupportedScheme {
                scheme: url.scheme().to_string(),
                location: location.to_string(),
            }),
            Err(e) => Err(OpenError::Http(format!("invalid URL {}: {}", location, e))),
        }
    }
}
