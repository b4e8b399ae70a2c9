//! # Values
//!
//! Typed values compared by criteria. A criterion's JSON `value` and every
//! user attribute are converted into a [`Value`] before evaluation.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Type tag of a [`Value`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Signed 64-bit integer
    Integer,
    /// 64-bit floating point number
    Float,
    /// UTF-8 string
    Text,
    /// Boolean flag
    Boolean,
    /// UTC point in time
    Timestamp,
}

impl ValueKind {
    /// Get the string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Text => "text",
            ValueKind::Boolean => "boolean",
            ValueKind::Timestamp => "timestamp",
        }
    }

    /// Check if values of this kind are numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueKind::Integer | ValueKind::Float)
    }

    /// Check if values of this kind support ordered comparison.
    pub fn is_orderable(&self) -> bool {
        self.is_numeric() || *self == ValueKind::Timestamp
    }

    /// Check if two kinds can be compared with each other.
    ///
    /// Integers and floats compare with each other; every other kind only
    /// compares with itself.
    pub fn is_comparable_with(&self, other: ValueKind) -> bool {
        (self.is_numeric() && other.is_numeric()) || *self == other
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point in time, remembering the string it was read from.
///
/// Strings that parse as RFC 3339 are still strings: containment and
/// equality against text use the source, ordering uses the parsed time.
/// Equality between timestamps compares the instant only.
///
/// # Example
///
/// ```
/// use forum_criteria::Timestamp;
///
/// let a = Timestamp::parse("2020-01-01T02:00:00+02:00").unwrap();
/// let b = Timestamp::parse("2020-01-01T00:00:00Z").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.source(), Some("2020-01-01T02:00:00+02:00"));
/// assert!(Timestamp::parse("2020-01-01").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Timestamp {
    at: DateTime<Utc>,
    source: Option<String>,
}

impl Timestamp {
    /// Parse an RFC 3339 string, keeping it as the source.
    pub fn parse(s: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(s).ok().map(|ts| Self {
            at: ts.with_timezone(&Utc),
            source: Some(s.to_string()),
        })
    }

    /// Get the instant.
    pub fn at(&self) -> DateTime<Utc> {
        self.at
    }

    /// Get the string the timestamp was read from, if any.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(at: DateTime<Utc>) -> Self {
        Self { at, source: None }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => f.write_str(source),
            None => f.write_str(&rfc3339(&self.at)),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// A typed criterion or attribute value.
///
/// Serializes untagged: numbers and booleans as JSON scalars, timestamps as
/// their source string or RFC 3339. Strings, from JSON or built in code, that
/// parse as RFC 3339 become timestamps carrying their source text.
///
/// # Example
///
/// ```
/// use forum_criteria::{Value, ValueKind};
/// use serde_json::json;
///
/// assert_eq!(Value::from_json(&json!(1500)).unwrap(), Value::Integer(1500));
/// assert_eq!(Value::from_json(&json!("bar")).unwrap().kind(), ValueKind::Text);
/// assert_eq!(
///     Value::from_json(&json!("2019-03-01T12:00:00Z")).unwrap().kind(),
///     ValueKind::Timestamp
/// );
/// assert_eq!(Value::from("2019-03-01T12:00:00Z").as_str(), Some("2019-03-01T12:00:00Z"));
/// assert!(Value::from_json(&json!(null)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Signed integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// String value
    Text(String),
    /// Boolean value
    Boolean(bool),
    /// Timestamp value
    Timestamp(Timestamp),
}

impl Value {
    /// Get the type tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::Text(_) => ValueKind::Text,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Timestamp(_) => ValueKind::Timestamp,
        }
    }

    /// Convert a JSON value.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem for `null`, arrays and objects.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, String> {
        match json {
            serde_json::Value::Bool(b) => Ok(Value::Boolean(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Value::Float(f))
                } else {
                    Err(format!("number {} is out of range", n))
                }
            }
            serde_json::Value::String(s) => Ok(Value::from(s.as_str())),
            serde_json::Value::Null => Err("null is not a comparable value".to_string()),
            serde_json::Value::Array(_) => Err("arrays are not comparable values".to_string()),
            serde_json::Value::Object(_) => Err("objects are not comparable values".to_string()),
        }
    }

    /// Convert into a JSON value.
    ///
    /// Non-finite floats have no JSON representation and become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Timestamp(ts) => serde_json::Value::String(ts.to_string()),
        }
    }

    /// Get the value as a float, if numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get the value as a string slice, if text or read from a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Timestamp(ts) => ts.source(),
            _ => None,
        }
    }

    /// Get the value as a boolean, if boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the value as a timestamp, if timestamp.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(ts) => Some(ts.at()),
            _ => None,
        }
    }

    /// Compare for equality with another value.
    ///
    /// # Returns
    ///
    /// `None` if the kinds cannot be compared. Timestamps read from strings
    /// compare with text by their source.
    pub fn equals(&self, other: &Value) -> Option<bool> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a == b),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a == b),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a == b),
            _ if self.kind().is_numeric() && other.kind().is_numeric() => {
                Some(self.as_f64() == other.as_f64())
            }
            _ => match (self.as_str(), other.as_str()) {
                (Some(a), Some(b)) => Some(a == b),
                _ => None,
            },
        }
    }

    /// Order this value against another.
    ///
    /// # Returns
    ///
    /// `None` if the kinds are not orderable against each other, or if a
    /// numeric comparison involves NaN
    pub fn ordering(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.at().cmp(&b.at())),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            },
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let json = serde_json::Value::deserialize(deserializer)?;
        Value::from_json(&json).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{:?}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Timestamp(ts) => write!(f, "{}", ts),
        }
    }
}

fn rfc3339(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v.into())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        match Timestamp::parse(v) {
            Some(ts) => Value::Timestamp(ts),
            None => Value::Text(v.to_string()),
        }
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        match Timestamp::parse(&v) {
            Some(ts) => Value::Timestamp(ts),
            None => Value::Text(v),
        }
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v.into())
    }
}
