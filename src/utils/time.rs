//! Timestamp helpers
//!
//! Alert lines and usage history use UTC ISO-8601 with a `Z` suffix; the
//! health snapshot's human-facing alert line uses local wall-clock time.

use chrono::{Local, SecondsFormat, Utc};

/// Current UTC time as ISO-8601 with microseconds and a `Z` suffix
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current local time as `YYYY-MM-DD HH:MM:SS`
pub fn local_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
