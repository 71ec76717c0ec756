//! In-memory opener.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use super::traits::{ByteStream, OpenError, Opener};

/// Opener serving byte buffers registered under exact location strings.
///
/// Buffers are shared, so opening the same location repeatedly is cheap
/// and each open gets an independent cursor.
#[derive(Debug, Default, Clone)]
pub struct MemoryOpener {
    entries: HashMap<String, Arc<[u8]>>,
}

impl MemoryOpener {
    /// Create an empty opener.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bytes under a location, builder style.
    pub fn with(mut self, location: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(location, bytes);
        self
    }

    /// Register bytes under a location, replacing any previous entry.
    pub fn insert(&mut self, location: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries
            .insert(location.into(), Arc::from(bytes.into().into_boxed_slice()));
    }

    /// Number of registered locations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Opener for MemoryOpener {
    fn open(&self, location: &str) -> Result<ByteStream, OpenError> {
        let bytes = self
            .entries
            .get(location)
            .cloned()
            .ok_or_else(|| OpenError::NotFound(location.to_string()))?;
        Ok(Box::new(Cursor::new(bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_memory_opener_independent_cursors() {
        let opener = MemoryOpener::new().with("a.csv", "x\n1\n");

        let mut first = opener.open("a.csv").unwrap();
        let mut second = opener.open("a.csv").unwrap();

        let mut buf = [0u8; 2];
        first.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"x\n");

        let mut all = String::new();
        second.read_to_string(&mut all).unwrap();
        assert_eq!(all, "x\n1\n");
    }

    #[test]
    fn test_memory_opener_unknown_location() {
        let opener = MemoryOpener::new();
        assert!(opener.is_empty());
        assert!(matches!(opener.open("missing"), Err(OpenError::NotFound(_))));
    }
}
