//! SQLite storage layer.
//!
//! Repository implementations backed by SQLite with WAL mode and split
//! read/write connection pools.

pub mod chat;
pub mod pool;
pub mod profile;
pub mod stats;

use chrono::{DateTime, SecondsFormat, Utc};
use tutoria_types::error::RepositoryError;

/// Parse a stored RFC 3339 timestamp.
pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Format a timestamp for storage.
///
/// Fixed microsecond precision with a `Z` suffix keeps lexical order equal
/// to chronological order, which the `ORDER BY created_at` queries rely on.
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}
