//! Shared utility functions

use chrono::{DateTime, Utc};

/// Parse an RFC 3339 timestamp column, falling back to the current time
/// when the stored value is unreadable.
pub fn parse_datetime_or_now(s: &str) -> DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
