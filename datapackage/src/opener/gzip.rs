//! Gzip-decompressing opener decorator.

use flate2::read::GzDecoder;

use super::traits::{ByteStream, OpenError, Opener};

/// Wraps another opener and inflates locations ending in `.gz`.
///
/// Other locations are passed through untouched. Decompression is
/// streaming; nothing is read until the caller pulls bytes.
#[derive(Debug, Default, Clone)]
pub struct GzipOpener<O> {
    inner: O,
}

impl<O: Opener> GzipOpener<O> {
    /// Wrap an opener.
    pub fn new(inner: O) -> Self {
        Self { inner }
    }

    /// Unwrap the inner opener.
    pub fn into_inner(self) -> O {
        self.inner
    }
}

impl<O: Opener> Opener for GzipOpener<O> {
    fn open(&self, location: &str) -> Result<ByteStream, OpenError> {
        let stream = self.inner.open(location)?;
        if location.ends_with(".gz") {
            Ok(Box::new(GzDecoder::new(stream)))
        } else {
            Ok(stream)
        }
    }
}
