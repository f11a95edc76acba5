pub mod auth;
pub mod contact;
pub mod import;
pub mod movies;
pub mod stats;

use chrono::{SecondsFormat, Utc};

/// ISO-8601 UTC timestamp with millisecond precision, e.g.
/// `2024-05-01T12:00:00.000Z`.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
