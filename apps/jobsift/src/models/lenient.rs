//! Tolerant parsing for scraped fields. A value that does not parse becomes `None`; it never
//! fails the posting that carries it.
//!
//! The `deserialize_*` functions are serde `deserialize_with` hooks for JSON input and accept
//! numbers, strings, booleans or null.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accepts plain numbers and the scraper's thousands-separated or currency-prefixed forms.
pub fn parse_amount(value: &str) -> Option<f64> {
    let cleaned: String = value
        .trim()
        .trim_start_matches(['$', '€', '£'])
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(trimmed).map(|dt| dt.date_naive()))
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ────────────────────────────────────────────────────────────────────────────
// serde hooks
// ────────────────────────────────────────────────────────────────────────────

pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()),
        Some(Value::String(s)) => parse_amount(&s),
        _ => None,
    })
}

pub fn deserialize_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => parse_bool(&s),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        _ => None,
    })
}

pub fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => parse_date(&s),
        _ => None,
    })
}

pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => parse_timestamp(&s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_forms() {
        assert_eq!(parse_amount("$85,000"), Some(85000.0));
        assert_eq!(parse_amount("42.5"), Some(42.5));
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("competitive"), None);
    }

    #[test]
    fn test_parse_timestamp_forms() {
        assert!(parse_timestamp("2024-05-01T10:00:00Z").is_some());
        assert!(parse_timestamp("2024-05-01 10:00:00.123").is_some());
        assert!(parse_timestamp("2024-05-01").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_parse_date_accepts_datetime_shapes() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1);
        assert_eq!(parse_date("2024-05-01"), expected);
        assert_eq!(parse_date("2024-05-01T09:15:00"), expected);
        assert_eq!(parse_date("05/01/2024"), None);
    }

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "deserialize_amount")]
        amount: Option<f64>,
        #[serde(default, deserialize_with = "deserialize_bool")]
        remote: Option<bool>,
        #[serde(default, deserialize_with = "deserialize_date")]
        posted: Option<NaiveDate>,
    }

    #[test]
    fn test_hooks_map_bad_values_to_none() {
        let row: Row =
            serde_json::from_str(r#"{"amount": "n/a", "remote": "maybe", "posted": 20240501}"#)
                .unwrap();
        assert!(row.amount.is_none());
        assert!(row.remote.is_none());
        assert!(row.posted.is_none());
    }

    #[test]
    fn test_hooks_accept_native_and_string_forms() {
        let row: Row =
            serde_json::from_str(r#"{"amount": "$90,000", "remote": 1, "posted": "2024-05-01"}"#)
                .unwrap();
        assert_eq!(row.amount, Some(90000.0));
        assert_eq!(row.remote, Some(true));
        assert_eq!(row.posted, NaiveDate::from_ymd_opt(2024, 5, 1));

        let row: Row = serde_json::from_str(r#"{"amount": 120000.5, "remote": false}"#).unwrap();
        assert_eq!(row.amount, Some(120000.5));
        assert_eq!(row.remote, Some(false));
        assert!(row.posted.is_none());
    }
}
