//! Lifecycle capability and best-effort outcomes
//!
//! Each backend implements [`Lifecycle`]; the controller picks the
//! implementation from the record's [`Backend`](crate::registry::Backend)
//! in exactly one place.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

use crate::registry::AppTarget;

/// Lifecycle errors raised by supervisor and process adapters
///
/// These never escape the controller: they are folded into an [`Outcome`].
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to run {program}: {reason}")]
    Command { program: String, reason: String },
    #[error("{program} exited with {code}: {stderr}")]
    NonZeroExit {
        program: String,
        code: String,
        stderr: String,
    },
    #[error("{program} timed out after {seconds}s")]
    Timeout { program: String, seconds: u64 },
    #[error("failed to spawn {program}: {reason}")]
    Spawn { program: String, reason: String },
}

impl LifecycleError {
    /// Map an I/O error from running `program`, keeping timeouts distinct
    pub fn from_io(program: &str, err: std::io::Error, seconds: u64) -> Self {
        if err.kind() == std::io::ErrorKind::TimedOut {
            LifecycleError::Timeout {
                program: program.to_string(),
                seconds,
            }
        } else {
            LifecycleError::Command {
                program: program.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

/// Classification of a best-effort step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Done,
    Skipped,
    Failed,
}

/// Result of a best-effort step, carrying the text that is printed and audited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    status: OutcomeStatus,
    text: String,
}

impl Outcome {
    pub fn done(text: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Done,
            text: text.into(),
        }
    }

    /// Skipped step; text is `skip: <reason>`
    pub fn skipped(reason: impl AsRef<str>) -> Self {
        Self {
            status: OutcomeStatus::Skipped,
            text: format!("skip: {}", reason.as_ref()),
        }
    }

    /// Failed step with text captured verbatim (e.g. command output)
    pub fn failed(text: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Failed,
            text: text.into(),
        }
    }

    /// Failed step; text is `error: <message>`
    pub fn error(message: impl AsRef<str>) -> Self {
        Self::failed(format!("error: {}", message.as_ref()))
    }

    pub fn status(&self) -> OutcomeStatus {
        self.status
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_failed(&self) -> bool {
        self.status == OutcomeStatus::Failed
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Lifecycle capability of one backend
#[async_trait]
pub trait Lifecycle: Send + Sync {
    /// Live state of the application as reported by this backend
    async fn probe(&self, alias: &str) -> String;

    /// Restart (or start) the application
    async fn restart(&self, target: &AppTarget) -> Outcome;
}
