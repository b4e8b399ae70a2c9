//! Serde helpers for the interchange's optional fields
//!
//! Exporters omit fields holding their zero value. These helpers give the
//! same shape on output and tolerate the quirks existing exporters produce on
//! input.

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer};

/// Seconds since the Unix epoch of `0001-01-01T00:00:00Z`, the zero time
/// some exporters write instead of omitting an unset date.
const ZERO_TIME_SECS: i64 = -62_135_596_800;

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

pub(crate) fn is_zero_i64(value: &i64) -> bool {
    *value == 0
}

pub(crate) fn is_zero_u64(value: &u64) -> bool {
    *value == 0
}

/// Read an optional timestamp, mapping the zero time to `None`.
pub(crate) fn optional_time<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<DateTime<Utc>>::deserialize(deserializer)?;
    Ok(value.filter(|ts| ts.timestamp() != ZERO_TIME_SECS))
}

/// Read an optional string that older exporters may have written as a number.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected a string or number, found {}",
            other
        ))),
    }
}
