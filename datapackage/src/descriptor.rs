//! Parsed `datapackage.json` descriptor.
//!
//! The descriptor is immutable once loaded. Accessors read package-level
//! metadata straight from the JSON document and apply the defaults the data
//! package format prescribes for absent keys.

use serde::Deserialize;
use serde_json::{Map, Value as Json};

use crate::error::{PackageError, PackageResult};

/// Version assumed when the descriptor does not declare one.
pub const DEFAULT_VERSION: &str = "0.0.1";

/// Descriptor file name, resolved against the package base.
pub const DESCRIPTOR_FILE: &str = "datapackage.json";

/// A data source credited by the package.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Source {
    pub name: String,
    #[serde(default)]
    pub web: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A license entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct License {
    /// Open Definition license id or free-form license name.
    #[serde(rename = "type", alias = "id")]
    pub license_type: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Immutable package descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    document: Map<String, Json>,
}

impl Descriptor {
    /// Wrap a parsed JSON document.
    ///
    /// The document must be an object; `resources`, when present, must be
    /// an array.
    pub fn from_json(document: Json) -> PackageResult<Self> {
        let document = match document {
            Json::Object(map) => map,
            other => {
                return Err(PackageError::InvalidDescriptor(format!(
                    "expected a JSON object, found {}",
                    json_kind(&other)
                )))
            }
        };

        match document.get("resources") {
            None | Some(Json::Array(_)) => {}
            Some(other) => {
                return Err(PackageError::InvalidDescriptor(format!(
                    "'resources' must be an array, found {}",
                    json_kind(other)
                )))
            }
        }

        Ok(Self { document })
    }

    /// Parse descriptor bytes.
    pub fn from_slice(bytes: &[u8], location: &str) -> PackageResult<Self> {
        let document =
            serde_json::from_slice(bytes).map_err(|source| PackageError::DescriptorParse {
                location: location.to_string(),
                source,
            })?;
        Self::from_json(document)
    }

    /// Raw access to a top-level key.
    pub fn get(&self, key: &str) -> Option<&Json> {
        self.document.get(key)
    }

    /// The whole document.
    pub fn as_map(&self) -> &Map<String, Json> {
        &self.document
    }

    /// Raw `resources` entries in descriptor order.
    pub fn resources(&self) -> &[Json] {
        self.document
            .get("resources")
            .and_then(Json::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Package name. Required: missing, null or empty is an error.
    pub fn name(&self) -> PackageResult<&str> {
        self.required_str("name")
    }

    /// Version of the data package format the descriptor follows.
    ///
    /// Kept as text: published descriptors use values like `1.0-beta.10`.
    pub fn datapackage_version(&self) -> PackageResult<&str> {
        self.required_str("datapackage_version")
    }

    pub fn title(&self) -> &str {
        self.optional_str("title")
    }

    pub fn description(&self) -> &str {
        self.optional_str("description")
    }

    pub fn homepage(&self) -> &str {
        self.optional_str("homepage")
    }

    pub fn image(&self) -> &str {
        self.optional_str("image")
    }

    /// Package version, defaulting to `0.0.1`.
    pub fn version(&self) -> PackageResult<semver::Version> {
        let raw = self
            .document
            .get("version")
            .and_then(Json::as_str)
            .unwrap_or(DEFAULT_VERSION);
        semver::Version::parse(raw).map_err(|source| PackageError::InvalidVersion {
            value: raw.to_string(),
            source,
        })
    }

    /// Search keywords; non-string entries are skipped.
    pub fn keywords(&self) -> Vec<String> {
        self.document
            .get("keywords")
            .and_then(Json::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Json::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Credited sources.
    pub fn sources(&self) -> PackageResult<Vec<Source>> {
        match self.document.get("sources") {
            None | Some(Json::Null) => Ok(Vec::new()),
            Some(value) => Vec::<Source>::deserialize(value)
                .map_err(|e| PackageError::InvalidDescriptor(format!("invalid sources: {}", e))),
        }
    }

    /// Licenses from the `licenses` array, or the legacy single `license`
    /// key (either a license id string or a license object).
    pub fn licenses(&self) -> PackageResult<Vec<License>> {
        let invalid = |e: serde_json::Error| {
            PackageError::InvalidDescriptor(format!("invalid licenses: {}", e))
        };

        if let Some(value) = self.document.get("licenses").filter(|v| !v.is_null()) {
            return Vec::<License>::deserialize(value).map_err(invalid);
        }

        match self.document.get("license") {
            None | Some(Json::Null) => Ok(Vec::new()),
            Some(Json::String(id)) => Ok(vec![License {
                license_type: id.clone(),
                url: None,
            }]),
            Some(value) => License::deserialize(value).map(|l| vec![l]).map_err(invalid),
        }
    }

    fn required_str(&self, key: &'static str) -> PackageResult<&str> {
        self.document
            .get(key)
            .and_then(Json::as_str)
            .filter(|s| !s.is_empty())
            .ok_or(PackageError::MissingMetadata(key))
    }

    fn optional_str(&self, key: &str) -> &str {
        self.document
            .get(key)
            .and_then(Json::as_str)
            .unwrap_or("")
    }
}

fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor(value: Json) -> Descriptor {
        Descriptor::from_json(value).unwrap()
    }

    #[test]
    fn test_name_required() {
        assert_eq!(descriptor(json!({"name": "test.dpkg"})).name().unwrap(), "test.dpkg");

        for doc in [json!({}), json!({"name": ""}), json!({"name": null})] {
            assert!(matches!(
                descriptor(doc).name(),
                Err(PackageError::MissingMetadata("name"))
            ));
        }
    }

    #[test]
    fn test_datapackage_version_kept_as_text() {
        let d = descriptor(json!({"datapackage_version": "1.0-beta.10"}));
        assert_eq!(d.datapackage_version().unwrap(), "1.0-beta.10");
        assert!(descriptor(json!({})).datapackage_version().is_err());
    }

    #[test]
    fn test_optional_strings_default_empty() {
        let d = descriptor(json!({"title": "A simple datapackage for testing"}));
        assert_eq!(d.title(), "A simple datapackage for testing");
        assert_eq!(d.description(), "");
        assert_eq!(d.homepage(), "");
        assert_eq!(d.image(), "");
    }

    #[test]
    fn test_version_default_and_invalid() {
        assert_eq!(
            descriptor(json!({})).version().unwrap(),
            semver::Version::new(0, 0, 1)
        );
        assert_eq!(
            descriptor(json!({"version": "1.2.3-rc.1"})).version().unwrap().to_string(),
            "1.2.3-rc.1"
        );
        assert!(matches!(
            descriptor(json!({"version": "1.0"})).version(),
            Err(PackageError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn test_keywords() {
        let d = descriptor(json!({"keywords": ["gdp", 5, "economics"]}));
        assert_eq!(d.keywords(), ["gdp", "economics"]);
        assert!(descriptor(json!({})).keywords().is_empty());
    }

    #[test]
    fn test_sources() {
        let d = descriptor(json!({"sources": [
            {"name": "World Bank", "web": "http://data.worldbank.org"},
            {"name": "Someone", "email": "someone@example.com"}
        ]}));
        let sources = d.sources().unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].web.as_deref(), Some("http://data.worldbank.org"));
        assert_eq!(sources[1].email.as_deref(), Some("someone@example.com"));

        let bad = descriptor(json!({"sources": [{"web": "http://x"}]}));
        assert!(bad.sources().is_err());
    }

    #[test]
    fn test_licenses_array_and_legacy_key() {
        let d = descriptor(json!({"licenses": [
            {"type": "ODC-PDDL-1.0", "url": "http://opendatacommons.org/licenses/pddl/"}
        ]}));
        assert_eq!(d.licenses().unwrap()[0].license_type, "ODC-PDDL-1.0");

        let legacy = descriptor(json!({"license": "CC-BY-4.0"}));
        assert_eq!(
            legacy.licenses().unwrap(),
            [License {
                license_type: "CC-BY-4.0".into(),
                url: None
            }]
        );

        let legacy_object = descriptor(json!({"license": {"id": "MIT"}}));
        assert_eq!(legacy_object.licenses().unwrap()[0].license_type, "MIT");

        assert!(descriptor(json!({})).licenses().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_shapes() {
        assert!(matches!(
            Descriptor::from_json(json!([1, 2])),
            Err(PackageError::InvalidDescriptor(_))
        ));
        assert!(matches!(
            Descriptor::from_json(json!({"resources": {}})),
            Err(PackageError::InvalidDescriptor(_))
        ));
        assert!(matches!(
            Descriptor::from_slice(b"{not json", "mem://datapackage.json"),
            Err(PackageError::DescriptorParse { .. })
        ));
    }

    #[test]
    fn test_resources_default_empty() {
        assert!(descriptor(json!({"name": "x"})).resources().is_empty());
        assert_eq!(
            descriptor(json!({"resources": [{"path": "a.csv"}]})).resources().len(),
            1
        );
    }
}
