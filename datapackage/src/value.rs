//! Coerced cell values and parsed rows.

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value as Json;

/// A latitude/longitude pair.
///
/// For JSON-array input `[a, b]` the first element becomes `lat`. Existing
/// payloads depend on that binding, so it is not swapped to GeoJSON order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A cell coerced to its declared field type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Integer(i64),
    Boolean(bool),
    Binary(Vec<u8>),
    /// Parsed `object`, `json` and `geojson` cells, and object-form geopoints.
    Json(Json),
    /// `array` cells: the raw text wrapped as a single element.
    Array(Vec<String>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    GeoPoint(GeoPoint),
    /// Untyped or unknown-type cells, passed through as decoded text.
    Text(String),
}

impl Value {
    /// Name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Integer(_) => "integer",
            Self::Boolean(_) => "boolean",
            Self::Binary(_) => "binary",
            Self::Json(_) => "json",
            Self::Array(_) => "array",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::Time(_) => "time",
            Self::GeoPoint(_) => "geopoint",
            Self::Text(_) => "text",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render the value as JSON.
    ///
    /// Binary is base64-encoded, temporal values use ISO 8601 text and
    /// geopoints become `{"lat": .., "lon": ..}` objects.
    pub fn to_json(&self) -> Json {
        match self {
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Self::Integer(n) => Json::from(*n),
            Self::Boolean(b) => Json::Bool(*b),
            Self::Binary(bytes) => Json::String(STANDARD.encode(bytes)),
            Self::Json(json) => json.clone(),
            Self::Array(items) => Json::Array(items.iter().cloned().map(Json::String).collect()),
            Self::Date(d) => Json::String(d.format("%Y-%m-%d").to_string()),
            Self::DateTime(dt) => Json::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
            Self::Time(t) => Json::String(t.format("%H:%M:%S").to_string()),
            Self::GeoPoint(p) => serde_json::json!({"lat": p.lat, "lon": p.lon}),
            Self::Text(s) => Json::String(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

/// One data row: field name → coerced value.
///
/// Fields sharing a name overwrite each other; the rightmost column wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRow {
    values: BTreeMap<String, Value>,
}

impl ParsedRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the one it replaced.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(field.into(), value)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.values.iter()
    }

    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.values
    }

    /// Render the row as a JSON object.
    pub fn to_json(&self) -> Json {
        Json::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a ParsedRow {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
