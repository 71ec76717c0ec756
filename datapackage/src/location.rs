//! Package base locations and relative-reference resolution.
//!
//! A package lives either in a local directory or behind a URL. Resource
//! locations in the descriptor are resolved against that base: local bases
//! use native path joining, remote bases use URL reference resolution
//! (so a base without a trailing slash has its last segment replaced).

use std::fmt;
use std::path::{Path, PathBuf};

use reqwest::Url;

use crate::error::{PackageError, PackageResult};

/// URL schemes fetched over the network.
const REMOTE_SCHEMES: &[&str] = &["http", "https", "ftp"];

/// Returns true if the string is an absolute network URL.
///
/// Windows drive paths such as `C:\data` parse as URLs with a one-letter
/// scheme; they are not network URLs.
pub fn is_url(location: &str) -> bool {
    Url::parse(location)
        .map(|url| REMOTE_SCHEMES.contains(&url.scheme()))
        .unwrap_or(false)
}

/// Returns true if the string refers to the local filesystem.
pub fn is_local(location: &str) -> bool {
    !is_url(location)
}

/// Where a data package lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseLocation {
    /// A directory on the local filesystem.
    Local(PathBuf),
    /// A remote base URL.
    Remote(Url),
}

impl BaseLocation {
    /// Classify a package URI.
    ///
    /// `file://` URIs are converted to local paths.
    pub fn parse(uri: &str) -> PackageResult<Self> {
        if is_url(uri) {
            let url = Url::parse(uri).map_err(|e| PackageError::InvalidLocation {
                location: uri.to_string(),
                reason: e.to_string(),
            })?;
            return Ok(Self::Remote(url));
        }

        let path = uri.strip_prefix("file://").unwrap_or(uri);
        Ok(Self::Local(PathBuf::from(path)))
    }

    /// Returns true for filesystem bases.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    /// Resolve a descriptor-relative reference to an absolute location.
    ///
    /// Absolute URLs are returned unchanged regardless of the base.
    pub fn resolve(&self, reference: &str) -> PackageResult<String> {
        if is_url(reference) {
            return Ok(reference.to_string());
        }

        match self {
            Self::Local(base) => Ok(join_path(base, reference)),
            Self::Remote(base) => base
                .join(reference)
                .map(String::from)
                .map_err(|e| PackageError::InvalidLocation {
                    location: reference.to_string(),
                    reason: e.to_string(),
                }),
        }
    }
}

fn join_path(base: &Path, reference: &str) -> String {
    base.join(reference).to_string_lossy().into_owned()
}

impl fmt::Display for BaseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => write!(f, "{}", url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("http://example.com/pkg/"));
        assert!(is_url("https://example.com/data.csv"));
        assert!(!is_url("tests/test.dpkg"));
        assert!(!is_url("/abs/path"));
        assert!(!is_url("C:\\data\\pkg"));
        assert!(is_local("file:///tmp/pkg"));
    }

    #[test]
    fn test_local_resolve_uses_path_join() {
        let base = BaseLocation::parse("tests/test.dpkg").unwrap();
        assert!(base.is_local());

        let expected = Path::new("tests/test.dpkg").join("data.csv");
        assert_eq!(
            base.resolve("data.csv").unwrap(),
            expected.to_string_lossy()
        );
    }

    #[test]
    fn test_local_resolve_absolute_path_replaces_base() {
        let base = BaseLocation::parse("/pkg").unwrap();
        assert_eq!(base.resolve("/elsewhere/data.csv").unwrap(), "/elsewhere/data.csv");
    }

    #[test]
    fn test_file_scheme_is_local() {
        let base = BaseLocation::parse("file:///srv/pkg").unwrap();
        assert_eq!(base, BaseLocation::Local(PathBuf::from("/srv/pkg")));
    }

    #[test]
    fn test_remote_resolve_with_trailing_slash() {
        let base = BaseLocation::parse("http://example.com/pkg/").unwrap();
        assert_eq!(
            base.resolve("datapackage.json").unwrap(),
            "http://example.com/pkg/datapackage.json"
        );
    }

    #[test]
    fn test_remote_resolve_replaces_last_segment() {
        let base = BaseLocation::parse("http://example.com/pkg").unwrap();
        assert_eq!(
            base.resolve("datapackage.json").unwrap(),
            "http://example.com/datapackage.json"
        );
    }

    #[test]
    fn test_absolute_url_reference_passes_through() {
        let base = BaseLocation::parse("/local/pkg").unwrap();
        assert_eq!(
            base.resolve("https://cdn.example.com/rows.csv").unwrap(),
            "https://cdn.example.com/rows.csv"
        );
    }
}
