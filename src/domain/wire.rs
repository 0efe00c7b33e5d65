//! Lenient field decoders for server JSON.
//!
//! The API is loosely typed: statuses can be free text, references can be
//! populated objects, hours can arrive as strings. A single odd field must
//! never fail decoding of a whole collection, so each helper degrades to
//! "absent" instead of erroring.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

/// Status text parsed case-insensitively; unknown values become `None`
pub(crate) fn status<'de, D, S>(deserializer: D) -> Result<Option<S>, D::Error>
where
    D: Deserializer<'de>,
    S: FromStr,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    })
}

/// Foreign key given either as an id string or a populated `{ "_id": .. }` object
pub(crate) fn reference<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(reference_id).map(str::to_string))
}

fn reference_id(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Object(map) => map.get("_id").and_then(Value::as_str).filter(|s| !s.is_empty()),
        _ => None,
    }
}

/// Non-negative hour count, from a number or a numeric string
pub(crate) fn hours<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed.filter(|h| h.is_finite() && *h >= 0.0))
}

/// Calendar date from `YYYY-MM-DD` or an RFC 3339 timestamp
pub(crate) fn date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => parse_date(&s),
        _ => None,
    })
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// Text that may be missing or null on the wire
pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        _ => String::new(),
    })
}

/// Optional text; non-string values are treated as absent
pub(crate) fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// List of strings; non-string entries are skipped
pub(crate) fn strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(reference_id)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_accepts_both_forms() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 14);
        assert_eq!(parse_date("2025-03-14"), expected);
        assert_eq!(parse_date("2025-03-14T00:00:00.000Z"), expected);
        assert_eq!(parse_date("next week"), None);
    }

    #[test]
    fn test_reference_id_shapes() {
        assert_eq!(reference_id(&Value::String("p1".into())), Some("p1"));
        assert_eq!(reference_id(&serde_json::json!({"_id": "p2", "name": "Beta"})), Some("p2"));
        assert_eq!(reference_id(&Value::String(String::new())), None);
        assert_eq!(reference_id(&Value::Null), None);
    }
}
