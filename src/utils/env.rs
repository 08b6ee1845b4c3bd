//! Environment variable utilities
//!
//! Blank values are treated the same as unset ones.

/// Get environment variable as Option
///
/// Returns `Some(value)` if set and non-empty, `None` otherwise.
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get environment variable as a float, treating absent or unparsable values as `0.0`
pub fn env_f64_or_zero(key: &str) -> f64 {
    env_opt(key)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
