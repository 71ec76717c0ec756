//! Local filesystem opener.

use std::fs::File;
use std::io::BufReader;

use tracing::debug;

use super::traits::{ByteStream, OpenError, Opener};

/// Opener for local files.
///
/// Accepts bare paths and `file://` URLs.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileOpener;

impl FileOpener {
    /// Create a new file opener.
    pub fn new() -> Self {
        Self
    }
}

impl Opener for FileOpener {
    fn open(&self, location: &str) -> Result<ByteStream, OpenError> {
        let path = location.strip_prefix("file://").unwrap_or(location);
        debug!(path = %path, "Opening local file");

        let file = File::open(path).map_err(|e| OpenError::io(location, e))?;
        Ok(Box::new(BufReader::new(file)))
    }
}
