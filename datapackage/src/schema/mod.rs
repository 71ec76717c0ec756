//! Resource and field schema types.
//!
//! A resource entry is built once per descriptor load from the raw JSON
//! resource object. Fields map to CSV columns positionally: the Nth field
//! spec describes the Nth column, whatever the header row says.

pub mod format;

use std::fmt;

use reqwest::Url;
use serde_json::Value as Json;

/// Encoding assumed when a resource does not declare one.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Declared semantic type of a field.
///
/// Matching on the descriptor's `type` string is case-sensitive. Type
/// strings outside the known vocabulary are kept in [`FieldType::Unknown`]
/// and coerced as plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Binary,
    Object,
    Json,
    GeoJson,
    Array,
    Date,
    DateTime,
    Time,
    GeoPoint,
    /// Unrecognised or missing type (empty string when missing).
    Unknown(String),
}

impl FieldType {
    /// Parse a descriptor type string.
    pub fn parse(s: &str) -> Self {
        match s {
            "string" => Self::String,
            "number" => Self::Number,
            "integer" => Self::Integer,
            "boolean" => Self::Boolean,
            "binary" => Self::Binary,
            "object" => Self::Object,
            "json" => Self::Json,
            "geojson" => Self::GeoJson,
            "array" => Self::Array,
            "date" => Self::Date,
            "datetime" => Self::DateTime,
            "time" => Self::Time,
            "geopoint" => Self::GeoPoint,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The descriptor spelling of this type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Binary => "binary",
            Self::Object => "object",
            Self::Json => "json",
            Self::GeoJson => "geojson",
            Self::Array => "array",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Time => "time",
            Self::GeoPoint => "geopoint",
            Self::Unknown(s) => s,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column of a resource schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name; falls back to the legacy `id` key, else empty.
    pub name: String,
    pub field_type: FieldType,
    /// Optional human format string, e.g. `dd/mm/yyyy`.
    pub format: Option<String>,
}

impl FieldSpec {
    /// Create a field spec without a format.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            format: None,
        }
    }

    /// Set the format string.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Build a field spec from a `schema.fields[]` entry.
    pub fn from_json(field: &Json) -> Self {
        let name = string_key(field, "name")
            .or_else(|| string_key(field, "id"))
            .unwrap_or_default();
        let field_type = FieldType::parse(string_key(field, "type").as_deref().unwrap_or(""));
        let format = string_key(field, "format");

        Self {
            name,
            field_type,
            format,
        }
    }
}

/// A tabular resource as registered by the package.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceEntry {
    /// Registry key: `name`, else legacy `id`, else empty.
    pub name: String,
    /// `url` if present, else `path`.
    pub location: Option<String>,
    /// Declared text encoding label.
    pub encoding: String,
    /// Ordered field specs; position N describes CSV column N.
    pub fields: Vec<FieldSpec>,
    pub path: Option<String>,
    pub url: Option<String>,
    format: Option<String>,
    pub mediatype: Option<String>,
    pub bytes: Option<u64>,
    pub hash: Option<String>,
    /// Inline `data` carried by the descriptor, if any.
    pub data: Option<Json>,
}

impl ResourceEntry {
    /// Create a resource entry from its parts.
    pub fn new(name: impl Into<String>, location: Option<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            name: name.into(),
            location,
            encoding: DEFAULT_ENCODING.to_string(),
            fields,
            path: None,
            url: None,
            format: None,
            mediatype: None,
            bytes: None,
            hash: None,
            data: None,
        }
    }

    /// Set the encoding label.
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Build a resource entry from a `resources[]` descriptor object.
    pub fn from_json(resource: &Json) -> Self {
        let path = string_key(resource, "path");
        let url = string_key(resource, "url");
        let name = string_key(resource, "name")
            .or_else(|| string_key(resource, "id"))
            .unwrap_or_default();
        let encoding =
            string_key(resource, "encoding").unwrap_or_else(|| DEFAULT_ENCODING.to_string());
        let fields = resource
            .get("schema")
            .and_then(|schema| schema.get("fields"))
            .and_then(Json::as_array)
            .map(|fields| fields.iter().map(FieldSpec::from_json).collect())
            .unwrap_or_default();

        Self {
            name,
            location: url.clone().or_else(|| path.clone()),
            encoding,
            fields,
            format: string_key(resource, "format"),
            mediatype: string_key(resource, "mediatype"),
            bytes: resource.get("bytes").and_then(Json::as_u64),
            hash: string_key(resource, "hash"),
            data: resource.get("data").cloned(),
            path,
            url,
        }
    }

    /// Declared format, else the extension of the path or URL path.
    pub fn format(&self) -> String {
        if let Some(format) = self.format.as_deref().filter(|f| !f.is_empty()) {
            return format.to_string();
        }

        if let Some(path) = &self.path {
            return extension(path);
        }

        self.url
            .as_deref()
            .and_then(|url| Url::parse(url).ok())
            .map(|url| extension(url.path()))
            .unwrap_or_default()
    }
}

/// Extension of the last segment of a slash-separated path, without the dot.
fn extension(path: &str) -> String {
    let segment = path.rsplit('/').next().unwrap_or(path);
    match segment.rfind('.') {
        Some(idx) if idx > 0 => segment[idx + 1..].to_string(),
        _ => String::new(),
    }
}

fn string_key(value: &Json, key: &str) -> Option<String> {
    value.get(key).and_then(Json::as_str).map(str::to_string)
}
