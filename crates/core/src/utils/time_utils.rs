use chrono::{DateTime, SecondsFormat, Utc};

use crate::errors::Result;

/// Formats an instant the way timestamps are persisted.
///
/// Fixed microsecond precision keeps lexicographic order equal to
/// chronological order, which the message and session indexes rely on.
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current instant in the persisted timestamp format.
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Parses a persisted timestamp back into a UTC instant.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}
