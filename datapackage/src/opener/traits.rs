//! Opener trait and its error type.

use std::io::{self, Read};

use thiserror::Error;

/// A readable byte stream returned by an opener.
pub type ByteStream = Box<dyn Read + Send>;

/// Errors raised while opening a location.
#[derive(Debug, Error)]
pub enum OpenError {
    /// Local I/O failure.
    #[error("I/O error on {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: io::Error,
    },

    /// HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The location is a URL whose scheme this opener cannot fetch.
    #[error("unsupported URL scheme '{scheme}' in {location}")]
    UnsupportedScheme { scheme: String, location: String },

    /// The location does not exist in the opener's namespace.
    #[error("location not found: {0}")]
    NotFound(String),
}

impl OpenError {
    pub(crate) fn io(location: &str, source: io::Error) -> Self {
        Self::Io {
            location: location.to_string(),
            source,
        }
    }
}

/// Trait for turning an absolute location into a byte stream.
///
/// This abstraction allows for dependency injection: the same streaming
/// pipeline reads from HTTP, the local filesystem, compressed archives or
/// memory depending on the opener it is handed.
pub trait Opener {
    /// Opens the location for reading.
    ///
    /// # Arguments
    ///
    /// * `location` - An absolute URL or filesystem path
    ///
    /// # Returns
    ///
    /// A reader positioned at the first byte, or an error. The stream is
    /// released when the returned box is dropped.
    fn open(&self, location: &str) -> Result<ByteStream, OpenError>;
}

impl<F> Opener for F
where
    F: Fn(&str) -> io::Result<ByteStream>,
{
    fn open(&self, location: &str) -> Result<ByteStream, OpenError> {
        self(location).map_err(|e| OpenError::io(location, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_closure_is_an_opener() {
        let opener = |location: &str| -> io::Result<ByteStream> {
            Ok(Box::new(Cursor::new(location.as_bytes().to_vec())))
        };

        let mut text = String::new();
        opener
            .open("hello")
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "hello");
    }

    #[test]
    fn test_closure_error_carries_location() {
        let opener = |_: &str| -> io::Result<ByteStream> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "nope"))
        };

        match opener.open("secret.csv") {
            Err(OpenError::Io { location, .. }) => assert_eq!(location, "secret.csv"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected an error"),
        }
    }
}
