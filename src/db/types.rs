//! Shared type definitions for the document store.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Errors specific to document store operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Schema migration failed: {0}")]
    Migration(String),

    #[error("Invalid document path: {0}")]
    InvalidPath(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Malformed document data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Sort direction for collection reads keyed on `createdAt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    NewestFirst,
    OldestFirst,
}

impl Order {
    pub(crate) fn sql(self) -> &'static str {
        match self {
            Order::NewestFirst => "DESC",
            Order::OldestFirst => "ASC",
        }
    }
}

/// A row from the `documents` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DbDocument {
    pub path: String,
    pub id: String,
    pub data: Value,
    /// Normalized `createdAt`; `None` if the document has no readable timestamp.
    pub created_at: Option<String>,
    pub updated_at: String,
}

impl DbDocument {
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        self.created_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Fixed-width RFC 3339 so that string order equals time order.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Read a stored `createdAt` value.
///
/// Accepts RFC 3339 strings, `{seconds, nanoseconds}` objects (also with
/// leading underscores, as exported by admin tools) and epoch milliseconds.
/// Anything else is treated as "no timestamp".
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(DateTime::from_timestamp_millis),
        Value::Object(map) => {
            let seconds = map
                .get("seconds")
                .or_else(|| map.get("_seconds"))
                .and_then(Value::as_i64)?;
            let nanos = map
                .get("nanoseconds")
                .or_else(|| map.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            DateTime::from_timestamp(seconds, u32::try_from(nanos).ok()?)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_rfc3339() {
        let at = parse_timestamp(&json!("2026-10-19T08:30:00+01:00")).unwrap();
        assert_eq!(format_timestamp(&at), "2026-10-19T07:30:00.000000Z");
    }

    #[test]
    fn test_parse_seconds_object() {
        let at = parse_timestamp(&json!({"seconds": 1_760_000_000, "nanoseconds": 5_000})).unwrap();
        assert_eq!(at.timestamp(), 1_760_000_000);
        assert_eq!(at.timestamp_subsec_nanos(), 5_000);

        let legacy = parse_timestamp(&json!({"_seconds": 1_760_000_000})).unwrap();
        assert_eq!(legacy.timestamp(), 1_760_000_000);
    }

    #[test]
    fn test_parse_epoch_millis() {
        let at = parse_timestamp(&json!(1_760_000_000_123_i64)).unwrap();
        assert_eq!(at.timestamp_millis(), 1_760_000_000_123);
    }

    #[test]
    fn test_parse_garbage_is_none() {
        assert!(parse_timestamp(&json!("yesterday")).is_none());
        assert!(parse_timestamp(&json!(null)).is_none());
        assert!(parse_timestamp(&json!(true)).is_none());
        assert!(parse_timestamp(&json!({"nanoseconds": 1})).is_none());
    }

    #[test]
    fn test_formatted_timestamps_sort_chronologically() {
        let a = parse_timestamp(&json!("2026-10-19T09:00:00Z")).unwrap();
        let b = parse_timestamp(&json!("2026-10-19T10:00:00.5Z")).unwrap();
        assert!(format_timestamp(&a) < format_timestamp(&b));
    }
}
