//! The type registry.
//!
//! Each column of a ROW stream declares one of a closed set of type tags. A
//! [`TypeTag`] selects the [`Converter`] that turns an (already unescaped)
//! wire token into a [`Value`] and back:
//!
//! | Tag | Wire form |
//! |-----|-----------|
//! | `bool` | `true` / `false` (case-insensitive on read) |
//! | `int` | base-10 `i64` |
//! | `float` | base-10 `f64`, shortest round-trippable form |
//! | `date` | `YYYY-MM-DD` |
//! | `datetime` | ISO-8601 with offset |
//! | `text` | identity |
//! | `binary` | standard base64 |
//!
//! Null handling lives in [`TypeTag::parse`] and [`TypeTag::serialize`], so
//! the converters themselves never see a null.
//!
//! ```rust
//! use row_format::{TypeTag, Value};
//!
//! let tag: TypeTag = "int".parse().unwrap();
//! assert_eq!(tag.parse(Some("42")).unwrap(), Value::Integer(42));
//! assert_eq!(tag.parse(None).unwrap(), Value::Null);
//! assert_eq!(tag.serialize(&Value::Integer(-7)).unwrap().as_deref(), Some("-7"));
//! assert!("string".parse::<TypeTag>().is_err());
//! ```

use crate::{Error, Result, Value};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a column type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "int")]
    Int,
    #[serde(rename = "float")]
    Float,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "datetime")]
    DateTime,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "binary")]
    Binary,
}

impl TypeTag {
    /// Every tag, in wire-vocabulary order.
    pub const ALL: [TypeTag; 7] = [
        TypeTag::Bool,
        TypeTag::Int,
        TypeTag::Float,
        TypeTag::Date,
        TypeTag::DateTime,
        TypeTag::Text,
        TypeTag::Binary,
    ];

    /// Returns the on-wire spelling of this tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Bool => BoolType::TAG,
            TypeTag::Int => IntType::TAG,
            TypeTag::Float => FloatType::TAG,
            TypeTag::Date => DateType::TAG,
            TypeTag::DateTime => DateTimeType::TAG,
            TypeTag::Text => TextType::TAG,
            TypeTag::Binary => BinaryType::TAG,
        }
    }

    /// Converts an unescaped wire token into a value; `None` is null.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conversion`] if the token is not valid for this type.
    pub fn parse(&self, token: Option<&str>) -> Result<Value> {
        let Some(text) = token else {
            return Ok(Value::Null);
        };
        match self {
            TypeTag::Bool => BoolType::parse(text),
            TypeTag::Int => IntType::parse(text),
            TypeTag::Float => FloatType::parse(text),
            TypeTag::Date => DateType::parse(text),
            TypeTag::DateTime => DateTimeType::parse(text),
            TypeTag::Text => TextType::parse(text),
            TypeTag::Binary => BinaryType::parse(text),
        }
    }

    /// Converts a value into its unescaped wire text; null yields `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conversion`] if the value does not belong to this type.
    /// Integers are accepted by `float` columns.
    pub fn serialize(&self, value: &Value) -> Result<Option<String>> {
        if value.is_null() {
            return Ok(None);
        }
        let text = match self {
            TypeTag::Bool => BoolType::serialize(value),
            TypeTag::Int => IntType::serialize(value),
            TypeTag::Float => FloatType::serialize(value),
            TypeTag::Date => DateType::serialize(value),
            TypeTag::DateTime => DateTimeType::serialize(value),
            TypeTag::Text => TextType::serialize(value),
            TypeTag::Binary => BinaryType::serialize(value),
        }?;
        Ok(Some(text))
    }
}

impl FromStr for TypeTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TypeTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| Error::UnknownType(s.to_string()))
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse/serialize pair for one column type.
///
/// Implementations only handle non-null values.
pub trait Converter {
    const TAG: &'static str;

    fn parse(text: &str) -> Result<Value>;

    fn serialize(value: &Value) -> Result<String>;
}

fn mismatch(tag: &'static str, value: &Value) -> Error {
    let kind = value.type_tag().map_or("null", |t| t.as_str());
    Error::conversion(tag, &format!("{} value", kind), "value does not match column type")
}

pub struct BoolType;

impl Converter for BoolType {
    const TAG: &'static str = "bool";

    fn parse(text: &str) -> Result<Value> {
        if text.eq_ignore_ascii_case("true") {
            Ok(Value::Bool(true))
        } else if text.eq_ignore_ascii_case("false") {
            Ok(Value::Bool(false))
        } else {
            Err(Error::conversion(Self::TAG, text, "expected 'true' or 'false'"))
        }
    }

    fn serialize(value: &Value) -> Result<String> {
        match value {
            Value::Bool(true) => Ok("true".to_string()),
            Value::Bool(false) => Ok("false".to_string()),
            other => Err(mismatch(Self::TAG, other)),
        }
    }
}

pub struct IntType;

impl Converter for IntType {
    const TAG: &'static str = "int";

    fn parse(text: &str) -> Result<Value> {
        text.parse::<i64>()
            .map(Value::Integer)
            .map_err(|e| Error::conversion(Self::TAG, text, e))
    }

    fn serialize(value: &Value) -> Result<String> {
        match value {
            Value::Integer(n) => Ok(n.to_string()),
            other => Err(mismatch(Self::TAG, other)),
        }
    }
}

pub struct FloatType;

impl Converter for FloatType {
    const TAG: &'static str = "float";

    fn parse(text: &str) -> Result<Value> {
        text.parse::<f64>()
            .map(Value::Float)
            .map_err(|e| Error::conversion(Self::TAG, text, e))
    }

    fn serialize(value: &Value) -> Result<String> {
        // Debug keeps the fractional part and round-trips exactly
        match value {
            Value::Float(f) => Ok(format!("{:?}", f)),
            Value::Integer(n) => Ok(format!("{:?}", *n as f64)),
            other => Err(mismatch(Self::TAG, other)),
        }
    }
}

// Outside four-digit years chrono writes a sign and extra digits, which no
// reader accepts back.
fn check_year(tag: &'static str, year: i32, text: &str) -> Result<()> {
    if (0..=9999).contains(&year) {
        Ok(())
    } else {
        Err(Error::conversion(tag, text, "year outside 0000-9999"))
    }
}

pub struct DateType;

impl DateType {
    const FORMAT: &'static str = "%Y-%m-%d";
}

impl Converter for DateType {
    const TAG: &'static str = "date";

    fn parse(text: &str) -> Result<Value> {
        let well_formed = text.len() == 10
            && text.bytes().enumerate().all(|(i, b)| match i {
                4 | 7 => b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !well_formed {
            return Err(Error::conversion(Self::TAG, text, "expected YYYY-MM-DD"));
        }
        NaiveDate::parse_from_str(text, Self::FORMAT)
            .map(Value::Date)
            .map_err(|e| Error::conversion(Self::TAG, text, e))
    }

    fn serialize(value: &Value) -> Result<String> {
        match value {
            Value::Date(d) => {
                let text = d.format(Self::FORMAT).to_string();
                check_year(Self::TAG, d.year(), &text)?;
                Ok(text)
            }
            other => Err(mismatch(Self::TAG, other)),
        }
    }
}

pub struct DateTimeType;

impl Converter for DateTimeType {
    const TAG: &'static str = "datetime";

    fn parse(text: &str) -> Result<Value> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(Value::DateTime(dt));
        }
        // Timestamps without an offset are taken as UTC
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
            .map(|naive| Value::DateTime(naive.and_utc().fixed_offset()))
            .ok_or_else(|| Error::conversion(Self::TAG, text, "expected an ISO-8601 timestamp"))
    }

    fn serialize(value: &Value) -> Result<String> {
        match value {
            Value::DateTime(dt) => {
                let text = dt.to_rfc3339_opts(SecondsFormat::AutoSi, false);
                check_year(Self::TAG, dt.year(), &text)?;
                Ok(text)
            }
            other => Err(mismatch(Self::TAG, other)),
        }
    }
}

pub struct TextType;

impl Converter for TextType {
    const TAG: &'static str = "text";

    fn parse(text: &str) -> Result<Value> {
        Ok(Value::Text(text.to_string()))
    }

    fn serialize(value: &Value) -> Result<String> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            other => Err(mismatch(Self::TAG, other)),
        }
    }
}

pub struct BinaryType;

impl Converter for BinaryType {
    const TAG: &'static str = "binary";

    fn parse(text: &str) -> Result<Value> {
        STANDARD
            .decode(text)
            .map(Value::Binary)
            .map_err(|e| Error::conversion(Self::TAG, text, e))
    }

    fn serialize(value: &Value) -> Result<String> {
        match value {
            Value::Binary(b) => Ok(STANDARD.encode(b)),
            other => Err(mismatch(Self::TAG, other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone, Timelike};

    #[test]
    fn test_tag_vocabulary() {
        for tag in TypeTag::ALL {
            assert_eq!(tag.as_str().parse::<TypeTag>().unwrap(), tag);
        }
        assert!(matches!("INT".parse::<TypeTag>(), Err(Error::UnknownType(_))));
        assert!(matches!("string".parse::<TypeTag>(), Err(Error::UnknownType(_))));
    }

    #[test]
    fn test_null_wraps_every_tag() {
        for tag in TypeTag::ALL {
            assert_eq!(tag.parse(None).unwrap(), Value::Null);
            assert_eq!(tag.serialize(&Value::Null).unwrap(), None);
        }
    }

    #[test]
    fn test_bool() {
        assert_eq!(TypeTag::Bool.parse(Some("TRUE")).unwrap(), Value::Bool(true));
        assert_eq!(TypeTag::Bool.parse(Some("False")).unwrap(), Value::Bool(false));
        assert!(matches!(
            TypeTag::Bool.parse(Some("yes")),
            Err(Error::Conversion { .. })
        ));
        assert_eq!(
            TypeTag::Bool.serialize(&Value::Bool(false)).unwrap().as_deref(),
            Some("false")
        );
    }

    #[test]
    fn test_int() {
        assert_eq!(TypeTag::Int.parse(Some("-1")).unwrap(), Value::Integer(-1));
        assert!(TypeTag::Int.parse(Some("1.5")).is_err());
        assert!(TypeTag::Int.parse(Some("abc")).is_err());
        assert!(TypeTag::Int.parse(Some("")).is_err());
    }

    #[test]
    fn test_float() {
        assert_eq!(TypeTag::Float.parse(Some("6.28")).unwrap(), Value::Float(6.28));
        assert_eq!(
            TypeTag::Float.serialize(&Value::Float(1.0)).unwrap().as_deref(),
            Some("1.0")
        );
        assert_eq!(
            TypeTag::Float.serialize(&Value::Integer(3)).unwrap().as_deref(),
            Some("3.0")
        );
        let inf = TypeTag::Float.serialize(&Value::Float(f64::INFINITY)).unwrap();
        assert_eq!(
            TypeTag::Float.parse(inf.as_deref()).unwrap(),
            Value::Float(f64::INFINITY)
        );
    }

    #[test]
    fn test_date() {
        let date = NaiveDate::from_ymd_opt(2014, 4, 29).unwrap();
        assert_eq!(TypeTag::Date.parse(Some("2014-04-29")).unwrap(), Value::Date(date));
        assert!(TypeTag::Date.parse(Some("2014-4-29")).is_err());
        assert!(TypeTag::Date.parse(Some("2014-02-30")).is_err());
        assert_eq!(
            TypeTag::Date.serialize(&Value::Date(date)).unwrap().as_deref(),
            Some("2014-04-29")
        );
    }

    #[test]
    fn test_date_year_range() {
        for year in [0, 9999] {
            let date = NaiveDate::from_ymd_opt(year, 12, 31).unwrap();
            let text = TypeTag::Date.serialize(&Value::Date(date)).unwrap();
            assert_eq!(TypeTag::Date.parse(text.as_deref()).unwrap(), Value::Date(date));
        }
        for year in [10000, -1] {
            let date = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
            assert!(matches!(
                TypeTag::Date.serialize(&Value::Date(date)),
                Err(Error::Conversion { tag: "date", .. })
            ));
        }
    }

    #[test]
    fn test_datetime_year_range() {
        // Local year 9999 even though the instant is in UTC year 10000
        let late = FixedOffset::west_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(9999, 12, 31, 23, 0, 0)
            .unwrap();
        let text = TypeTag::DateTime.serialize(&Value::DateTime(late)).unwrap();
        assert_eq!(
            TypeTag::DateTime.parse(text.as_deref()).unwrap(),
            Value::DateTime(late)
        );

        let utc = FixedOffset::east_opt(0).unwrap();
        for year in [10000, -1] {
            let dt = utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap();
            assert!(matches!(
                TypeTag::DateTime.serialize(&Value::DateTime(dt)),
                Err(Error::Conversion { tag: "datetime", .. })
            ));
        }
    }

    #[test]
    fn test_datetime_keeps_offset() {
        let parsed = TypeTag::DateTime
            .parse(Some("1987-04-29T03:02:00-03:00"))
            .unwrap();
        let expected = FixedOffset::west_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(1987, 4, 29, 3, 2, 0)
            .unwrap();
        assert_eq!(parsed, Value::DateTime(expected));
        assert_eq!(
            TypeTag::DateTime.serialize(&parsed).unwrap().as_deref(),
            Some("1987-04-29T03:02:00-03:00")
        );
    }

    #[test]
    fn test_datetime_without_offset_is_utc() {
        let parsed = TypeTag::DateTime.parse(Some("2020-01-02T03:04:05")).unwrap();
        let dt = parsed.as_datetime().unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 0);
        assert_eq!(dt.hour(), 3);
        assert!(TypeTag::DateTime.parse(Some("yesterday")).is_err());
    }

    #[test]
    fn test_binary() {
        assert_eq!(
            TypeTag::Binary.parse(Some("aGVsbG8=")).unwrap(),
            Value::Binary(b"hello".to_vec())
        );
        assert!(TypeTag::Binary.parse(Some("not base64!")).is_err());
    }

    #[test]
    fn test_mismatched_value() {
        let err = TypeTag::Int.serialize(&Value::from("12")).unwrap_err();
        assert!(matches!(err, Error::Conversion { tag: "int", .. }));
    }
}
