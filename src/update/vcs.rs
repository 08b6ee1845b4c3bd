//! Fast-forward source updates

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::lifecycle::{LifecycleError, Outcome};
use crate::utils::run_with_timeout;

/// Version-control update of a working copy
#[async_trait]
pub trait SourcePuller: Send + Sync {
    /// Whether `path` is a working copy this puller can update
    fn is_working_copy(&self, path: &Path) -> bool;

    /// Fast-forward-only update; any output is captured verbatim
    async fn fast_forward(&self, path: &Path) -> Outcome;
}

/// `git pull --ff-only`
pub struct GitPuller {
    program: String,
    timeout: Duration,
}

impl GitPuller {
    pub fn new(timeout: Duration) -> Self {
        Self::with_program("git", timeout)
    }

    pub fn with_program(program: &str, timeout: Duration) -> Self {
        Self {
            program: program.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl SourcePuller for GitPuller {
    fn is_working_copy(&self, path: &Path) -> bool {
        // .git may be a file for worktrees and submodules
        path.join(".git").exists()
    }

    async fn fast_forward(&self, path: &Path) -> Outcome {
        debug!("Running {} pull --ff-only in {:?}", self.program, path);
        let mut command = Command::new(&self.program);
        command.args(["pull", "--ff-only"]).current_dir(path);

        let output = match run_with_timeout(&mut command, self.timeout).await {
            Ok(output) => output,
            Err(e) => {
                let err = LifecycleError::from_io(&self.program, e, self.timeout.as_secs());
                return Outcome::error(err.to_string());
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let text = if stdout.is_empty() { stderr } else { stdout };

        if output.status.success() {
            Outcome::done(text)
        } else {
            Outcome::failed(text)
        }
    }
}
