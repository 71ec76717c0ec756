//! Field parser resolution.
//!
//! [`resolve`] turns one field spec into a [`FieldParser`]: a pre-computed
//! coercion strategy that converts raw cell text into a typed [`Value`].
//! Resolution happens once per column when a stream is opened, so the per-row
//! hot path does no type-string dispatch. Parsers never perform I/O.
//!
//! Two behaviours look like bugs but are relied on by existing packages:
//!
//! - `boolean` is a truthiness cast: any non-empty text, including `"false"`,
//!   is `true`.
//! - geopoint JSON arrays bind element 0 to `lat` and element 1 to `lon`.

use std::num::{ParseFloatError, ParseIntError};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::format::{ParseResult, Parsed, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value as Json;
use thiserror::Error;

use crate::schema::format::to_strftime;
use crate::schema::{FieldSpec, FieldType};
use crate::value::{GeoPoint, Value};

/// Fixed pattern for `date` fields without a format.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Fixed pattern for `datetime` fields without a format, before the zone token.
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Fixed pattern for `time` fields.
pub const TIME_FORMAT: &str = "%H:%M";

/// Zone names accepted after a default-format datetime. The name is dropped.
const ZONE_NAMES: &[&str] = &["Z", "UTC", "GMT"];

/// Year assumed when a custom format has no year directive.
const DEFAULT_YEAR: i64 = 1900;

/// Two-digit years below this belong to the 2000s, the rest to the 1900s.
const TWO_DIGIT_YEAR_PIVOT: i32 = 69;

/// A single cell failed to convert. Carries no field or row context.
#[derive(Debug, Error)]
pub enum CoercionError {
    #[error("invalid number: {0}")]
    Number(#[from] ParseFloatError),

    #[error("invalid integer: {0}")]
    Integer(#[from] ParseIntError),

    #[error("invalid base64: {0}")]
    Binary(#[from] base64::DecodeError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("'{value}' does not match format '{format}': {source}")]
    Temporal {
        value: String,
        format: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("invalid geopoint '{0}'")]
    GeoPoint(String),
}

impl CoercionError {
    fn temporal(value: &str, format: &str, source: chrono::ParseError) -> Self {
        Self::Temporal {
            value: value.to_string(),
            format: format.to_string(),
            source,
        }
    }
}

/// Pre-computed coercion strategy for a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Coercion {
    Number,
    Integer,
    Boolean,
    Binary,
    Json,
    Array,
    /// strftime pattern, or `None` for the fixed default.
    Date(Option<String>),
    DateTime(Option<String>),
    Time,
    GeoPoint,
    Text,
}

/// Coercion function for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldParser {
    coercion: Coercion,
}

/// Resolve the parser for a field spec.
///
/// Custom formats are only consulted for `date` and `datetime`.
pub fn resolve(field: &FieldSpec) -> FieldParser {
    let custom = || field.format.as_deref().map(to_strftime);

    let coercion = match &field.field_type {
        FieldType::Number => Coercion::Number,
        FieldType::Integer => Coercion::Integer,
        FieldType::Boolean => Coercion::Boolean,
        FieldType::Binary => Coercion::Binary,
        FieldType::Object | FieldType::Json | FieldType::GeoJson => Coercion::Json,
        FieldType::Array => Coercion::Array,
        FieldType::Date => Coercion::Date(custom()),
        FieldType::DateTime => Coercion::DateTime(custom()),
        FieldType::Time => Coercion::Time,
        FieldType::GeoPoint => Coercion::GeoPoint,
        FieldType::String | FieldType::Unknown(_) => Coercion::Text,
    };

    FieldParser { coercion }
}

impl FieldParser {
    /// Coerce raw cell text.
    pub fn parse(&self, raw: &str) -> Result<Value, CoercionError> {
        match &self.coercion {
            Coercion::Number => Ok(Value::Number(raw.trim().parse()?)),
            Coercion::Integer => Ok(Value::Integer(raw.trim().parse()?)),
            Coercion::Boolean => Ok(Value::Boolean(!raw.is_empty())),
            Coercion::Binary => Ok(Value::Binary(decode_base64(raw)?)),
            Coercion::Json => Ok(Value::Json(serde_json::from_str(raw)?)),
            Coercion::Array => Ok(Value::Array(vec![raw.to_string()])),
            Coercion::Date(None) => NaiveDate::parse_from_str(raw, DEFAULT_DATE_FORMAT)
                .map(Value::Date)
                .map_err(|e| CoercionError::temporal(raw, DEFAULT_DATE_FORMAT, e)),
            Coercion::Date(Some(format)) => parse_custom_datetime(raw, format)
                .map(|dt| Value::Date(dt.date()))
                .map_err(|e| CoercionError::temporal(raw, format, e)),
            Coercion::DateTime(None) => parse_default_datetime(raw).map(Value::DateTime),
            Coercion::DateTime(Some(format)) => parse_custom_datetime(raw, format)
                .map(Value::DateTime)
                .map_err(|e| CoercionError::temporal(raw, format, e)),
            Coercion::Time => NaiveTime::parse_from_str(raw, TIME_FORMAT)
                .map(Value::Time)
                .map_err(|e| CoercionError::temporal(raw, TIME_FORMAT, e)),
            Coercion::GeoPoint => parse_geopoint(raw),
            Coercion::Text => Ok(Value::Text(raw.to_string())),
        }
    }
}

/// Decode base64, skipping bytes outside the alphabet (line breaks,
/// stray whitespace). Padding is still required.
fn decode_base64(raw: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let cleaned: Vec<u8> = raw
        .bytes()
        .filter(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
        .collect();
    STANDARD.decode(cleaned)
}

/// Parse with a translated schema format.
///
/// Fields the format does not mention take strptime defaults: year 1900,
/// January, the 1st, midnight. `%y` pivots at 69, so `69` is 1969 and
/// `68` is 2068.
fn parse_custom_datetime(raw: &str, format: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let mut parsed = Parsed::new();
    chrono::format::parse(&mut parsed, raw, StrftimeItems::new(format))?;
    fill_unset_fields(&mut parsed)?;
    parsed.to_naive_datetime_with_offset(0)
}

fn fill_unset_fields(parsed: &mut Parsed) -> ParseResult<()> {
    // A timestamp fixes every field; defaults would only conflict with it.
    if parsed.timestamp().is_some() {
        return Ok(());
    }

    if parsed.year().is_none() && parsed.year_div_100().is_none() {
        match parsed.year_mod_100() {
            Some(yy) if yy < TWO_DIGIT_YEAR_PIVOT => parsed.set_year(i64::from(2000 + yy))?,
            Some(yy) => parsed.set_year(i64::from(1900 + yy))?,
            None if parsed.isoyear().is_none() => parsed.set_year(DEFAULT_YEAR)?,
            None => {}
        }
    }

    let week_based = parsed.ordinal().is_some()
        || parsed.isoweek().is_some()
        || parsed.week_from_sun().is_some()
        || parsed.week_from_mon().is_some();
    if !week_based {
        if parsed.month().is_none() {
            parsed.set_month(1)?;
        }
        if parsed.day().is_none() {
            parsed.set_day(1)?;
        }
    }

    if parsed.hour_div_12().is_none() && parsed.hour_mod_12().is_none() {
        parsed.set_hour(0)?;
    }
    if parsed.minute().is_none() {
        parsed.set_minute(0)?;
    }
    Ok(())
}

/// Parse `YYYY-MM-DDTHH:MM:SS` with an optional zone token.
///
/// Zone names (`Z`, `UTC`, `GMT`) are accepted and dropped. Numeric offsets
/// such as `+02:00` are applied, yielding the UTC wall time.
fn parse_default_datetime(raw: &str) -> Result<NaiveDateTime, CoercionError> {
    let naive = |text: &str| NaiveDateTime::parse_from_str(text, DEFAULT_DATETIME_FORMAT);

    let first_err = match naive(raw) {
        Ok(dt) => return Ok(dt),
        Err(e) => e,
    };

    for zone in ZONE_NAMES {
        if let Some(stripped) = raw.strip_suffix(zone) {
            if let Ok(dt) = naive(stripped.trim_end()) {
                return Ok(dt);
            }
        }
    }

    let with_offset = format!("{}%:z", DEFAULT_DATETIME_FORMAT);
    DateTime::parse_from_str(raw, &with_offset)
        .map(|dt| dt.naive_utc())
        .map_err(|_| CoercionError::temporal(raw, DEFAULT_DATETIME_FORMAT, first_err))
}

/// Parse a geopoint from JSON array, JSON object, or `"lat, lon"` text.
///
/// Arrays need two numeric leading elements; objects are returned as-is.
/// Other JSON (a bare number or string, an array of non-numbers) is rejected
/// rather than passed through unchanged, so a geopoint column never yields
/// a scalar.
fn parse_geopoint(raw: &str) -> Result<Value, CoercionError> {
    match serde_json::from_str::<Json>(raw) {
        Ok(Json::Array(items)) => match (
            items.first().and_then(Json::as_f64),
            items.get(1).and_then(Json::as_f64),
        ) {
            (Some(lat), Some(lon)) => Ok(Value::GeoPoint(GeoPoint::new(lat, lon))),
            _ => Err(CoercionError::GeoPoint(raw.to_string())),
        },
        Ok(object @ Json::Object(_)) => Ok(Value::Json(object)),
        Ok(_) => Err(CoercionError::GeoPoint(raw.to_string())),
        Err(_) => parse_geopoint_text(raw),
    }
}

fn parse_geopoint_text(raw: &str) -> Result<Value, CoercionError> {
    let mut parts = raw.split(',');
    match (parts.next(), parts.next()) {
        (Some(lat), Some(lon)) => Ok(Value::GeoPoint(GeoPoint::new(
            lat.trim().parse()?,
            lon.trim().parse()?,
        ))),
        _ => Err(CoercionError::GeoPoint(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn parse(field_type: FieldType, raw: &str) -> Result<Value, CoercionError> {
        resolve(&FieldSpec::new("f", field_type)).parse(raw)
    }

    fn parse_with_format(
        field_type: FieldType,
        format: &str,
        raw: &str,
    ) -> Result<Value, CoercionError> {
        resolve(&FieldSpec::new("f", field_type).with_format(format)).parse(raw)
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_number() {
        assert_eq!(parse(FieldType::Number, "3.14").unwrap(), Value::Number(3.14));
        assert_eq!(parse(FieldType::Number, " 2 ").unwrap(), Value::Number(2.0));
        assert!(matches!(
            parse(FieldType::Number, "abc"),
            Err(CoercionError::Number(_))
        ));
    }

    #[test]
    fn test_integer() {
        assert_eq!(parse(FieldType::Integer, "42").unwrap(), Value::Integer(42));
        assert_eq!(parse(FieldType::Integer, "-7").unwrap(), Value::Integer(-7));
        assert!(matches!(
            parse(FieldType::Integer, "4.2"),
            Err(CoercionError::Integer(_))
        ));
    }

    #[test]
    fn test_boolean_is_truthiness() {
        assert_eq!(parse(FieldType::Boolean, "true").unwrap(), Value::Boolean(true));
        assert_eq!(parse(FieldType::Boolean, "false").unwrap(), Value::Boolean(true));
        assert_eq!(parse(FieldType::Boolean, "0").unwrap(), Value::Boolean(true));
        assert_eq!(parse(FieldType::Boolean, "").unwrap(), Value::Boolean(false));
    }

    #[test]
    fn test_binary() {
        assert_eq!(
            parse(FieldType::Binary, "aGVsbG8=").unwrap(),
            Value::Binary(b"hello".to_vec())
        );
        assert!(matches!(
            parse(FieldType::Binary, "aGVsbG8"),
            Err(CoercionError::Binary(_))
        ));
    }

    #[test]
    fn test_binary_skips_bytes_outside_alphabet() {
        assert_eq!(
            parse(FieldType::Binary, "aGVs\nbG8=").unwrap(),
            Value::Binary(b"hello".to_vec())
        );
        assert_eq!(
            parse(FieldType::Binary, " aGVs bG8= ").unwrap(),
            Value::Binary(b"hello".to_vec())
        );
    }

    #[test]
    fn test_json_family() {
        for field_type in [FieldType::Object, FieldType::Json, FieldType::GeoJson] {
            assert_eq!(
                parse(field_type, r#"{"a": [1, 2]}"#).unwrap(),
                Value::Json(json!({"a": [1, 2]}))
            );
        }
        assert!(matches!(
            parse(FieldType::Json, "{oops"),
            Err(CoercionError::Json(_))
        ));
    }

    #[test]
    fn test_array_wraps_raw_text() {
        assert_eq!(
            parse(FieldType::Array, "[1, 2]").unwrap(),
            Value::Array(vec!["[1, 2]".to_string()])
        );
        assert_eq!(
            parse(FieldType::Array, "abc").unwrap(),
            Value::Array(vec!["abc".to_string()])
        );
    }

    #[test]
    fn test_default_date() {
        assert_eq!(
            parse(FieldType::Date, "2020-06-05").unwrap(),
            Value::Date(ymd(2020, 6, 5))
        );
        assert!(matches!(
            parse(FieldType::Date, "05/06/2020"),
            Err(CoercionError::Temporal { .. })
        ));
    }

    #[test]
    fn test_custom_date_format() {
        assert_eq!(
            parse_with_format(FieldType::Date, "dd/mm/yyyy", "05/06/2020").unwrap(),
            Value::Date(ymd(2020, 6, 5))
        );
        assert_eq!(
            parse_with_format(FieldType::Date, "MM-DD-YY", "12-31-99").unwrap(),
            Value::Date(ymd(1999, 12, 31))
        );
    }

    #[test]
    fn test_custom_date_truncates_time() {
        let value =
            parse_with_format(FieldType::Date, "yyyy-mm-dd :mm:ss", "2021-03-04 :15:30").unwrap();
        assert_eq!(value, Value::Date(ymd(2021, 3, 4)));
    }

    #[test]
    fn test_custom_datetime_format() {
        let value = parse_with_format(FieldType::DateTime, "dd.mm.yyyy", "01.02.2003").unwrap();
        assert_eq!(
            value,
            Value::DateTime(ymd(2003, 2, 1).and_hms_opt(0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_custom_format_fills_missing_day_and_month() {
        assert_eq!(
            parse_with_format(FieldType::Date, "mm/yyyy", "06/2020").unwrap(),
            Value::Date(ymd(2020, 6, 1))
        );
        assert_eq!(
            parse_with_format(FieldType::Date, "yyyy", "2020").unwrap(),
            Value::Date(ymd(2020, 1, 1))
        );
        assert_eq!(
            parse_with_format(FieldType::DateTime, "mm/yyyy", "06/2020").unwrap(),
            Value::DateTime(ymd(2020, 6, 1).and_hms_opt(0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_with_format(FieldType::DateTime, "yyyy", "2020").unwrap(),
            Value::DateTime(ymd(2020, 1, 1).and_hms_opt(0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_custom_format_without_year_uses_1900() {
        assert_eq!(
            parse_with_format(FieldType::Date, "dd/mm", "24/12").unwrap(),
            Value::Date(ymd(1900, 12, 24))
        );
    }

    #[test]
    fn test_two_digit_year_pivot() {
        assert_eq!(
            parse_with_format(FieldType::Date, "dd/mm/yy", "01/01/69").unwrap(),
            Value::Date(ymd(1969, 1, 1))
        );
        assert_eq!(
            parse_with_format(FieldType::Date, "dd/mm/yy", "01/01/68").unwrap(),
            Value::Date(ymd(2068, 1, 1))
        );
        assert_eq!(
            parse_with_format(FieldType::DateTime, "dd/mm/yy", "31/12/99").unwrap(),
            Value::DateTime(ymd(1999, 12, 31).and_hms_opt(0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_custom_format_mismatch_is_error() {
        assert!(matches!(
            parse_with_format(FieldType::Date, "dd/mm/yyyy", "2020-06-05"),
            Err(CoercionError::Temporal { .. })
        ));
    }

    #[test]
    fn test_default_datetime_zone_tokens() {
        let expected = ymd(2015, 1, 2).and_hms_opt(3, 4, 5).unwrap();
        for raw in [
            "2015-01-02T03:04:05",
            "2015-01-02T03:04:05Z",
            "2015-01-02T03:04:05UTC",
            "2015-01-02T03:04:05 GMT",
        ] {
            assert_eq!(parse(FieldType::DateTime, raw).unwrap(), Value::DateTime(expected));
        }

        let shifted = parse(FieldType::DateTime, "2015-01-02T05:04:05+02:00").unwrap();
        assert_eq!(shifted, Value::DateTime(expected));

        assert!(matches!(
            parse(FieldType::DateTime, "2015-01-02"),
            Err(CoercionError::Temporal { .. })
        ));
    }

    #[test]
    fn test_time() {
        assert_eq!(
            parse(FieldType::Time, "13:45").unwrap(),
            Value::Time(NaiveTime::from_hms_opt(13, 45, 0).unwrap())
        );
        assert!(parse(FieldType::Time, "25:00").is_err());
    }

    #[test]
    fn test_geopoint_json_array() {
        assert_eq!(
            parse(FieldType::GeoPoint, "[1.0, 2.0]").unwrap(),
            Value::GeoPoint(GeoPoint::new(1.0, 2.0))
        );
    }

    #[test]
    fn test_geopoint_text_fallback() {
        assert_eq!(
            parse(FieldType::GeoPoint, "1.0, 2.0").unwrap(),
            Value::GeoPoint(GeoPoint::new(1.0, 2.0))
        );
    }

    #[test]
    fn test_geopoint_object_returned_as_is() {
        assert_eq!(
            parse(FieldType::GeoPoint, r#"{"lat": 5, "lon": 6}"#).unwrap(),
            Value::Json(json!({"lat": 5, "lon": 6}))
        );
    }

    #[test]
    fn test_geopoint_failures() {
        for raw in ["nowhere", "1.0", "[1.0]", "[\"a\", \"b\"]", "1.0,north"] {
            assert!(parse(FieldType::GeoPoint, raw).is_err(), "{raw} should fail");
        }
    }

    #[test]
    fn test_unknown_and_string_pass_through() {
        assert_eq!(
            parse(FieldType::String, " keep me ").unwrap(),
            Value::Text(" keep me ".to_string())
        );
        assert_eq!(
            parse(FieldType::Unknown("duration".into()), "P1D").unwrap(),
            Value::Text("P1D".to_string())
        );
    }

    #[test]
    fn test_format_ignored_for_non_temporal_types() {
        assert_eq!(
            parse_with_format(FieldType::Integer, "dd/mm/yyyy", "5").unwrap(),
            Value::Integer(5)
        );
    }

    proptest! {
        #[test]
        fn prop_integer_roundtrip(n in any::<i64>()) {
            prop_assert_eq!(parse(FieldType::Integer, &n.to_string()).unwrap(), Value::Integer(n));
        }

        #[test]
        fn prop_number_roundtrip(x in -1.0e12f64..1.0e12) {
            prop_assert_eq!(parse(FieldType::Number, &x.to_string()).unwrap(), Value::Number(x));
        }

        #[test]
        fn prop_boolean_is_non_empty(s in ".*") {
            prop_assert_eq!(parse(FieldType::Boolean, &s).unwrap(), Value::Boolean(!s.is_empty()));
        }
    }
}
