//! Error handling utilities for graceful degradation
//!
//! Helpers for log-and-continue handling of best-effort operations.

use tracing::warn;

/// Execute an operation and log errors without failing
///
/// Returns `Some(T)` on success, `None` on error (after logging).
/// Useful for best-effort writes that must not stop a batch.
///
/// # Example
/// ```rust
/// use fleetkeeper::utils::log_error;
///
/// let written = log_error(|| std::fs::write("/nonexistent/dir/file", "x"), "Failed to write file");
/// assert!(written.is_none());
/// ```
pub fn log_error<F, T, E>(operation: F, context: &str) -> Option<T>
where
    F: FnOnce() -> Result<T, E>,
    E: std::fmt::Display,
{
    match operation() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{}: {}", context, e);
            None
        }
    }
}
