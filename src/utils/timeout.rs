//! Timeout utilities for external calls
//!
//! Every external process and network call made by the supervisor is bounded.
//! The constants below are the defaults for the `timeout_seconds` settings in
//! `crate::config::FleetConfig`.

use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Default timeout for service manager commands
pub const DEFAULT_SUPERVISOR_TIMEOUT: Duration = Duration::from_secs(15);

/// Default timeout for a fast-forward pull
pub const DEFAULT_PULL_TIMEOUT: Duration = Duration::from_secs(120);

/// Default timeout for the usage endpoint
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Default timeout for the chat notifier
pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Run a command to completion, capturing its output, bounded by `duration`
///
/// The child is killed if the deadline passes. An elapsed deadline is reported
/// as an `io::ErrorKind::TimedOut` error so callers handle it like any other
/// failure to run the command.
pub async fn run_with_timeout(
    command: &mut Command,
    duration: Duration,
) -> std::io::Result<Output> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match timeout(duration, command.output()).await {
        Ok(result) => result,
        Err(_) => Err(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            format!("timed out after {}s", duration.as_secs()),
        )),
    }
}
