//! External supervisor access
//!
//! The externally-supervised backend delegates liveness and restarts to the
//! host's service manager, addressed by unit name (`<alias>.service`).

use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::lifecycle::traits::LifecycleError;
use crate::utils::run_with_timeout;

/// Service manager operations used by the externally-supervised backend
#[async_trait]
pub trait ServiceSupervisor: Send + Sync {
    /// Active/inactive classification of a unit, verbatim
    async fn is_active(&self, unit: &str) -> Result<String, LifecycleError>;

    /// Issue a restart request for a unit
    async fn restart(&self, unit: &str) -> Result<(), LifecycleError>;
}

/// `systemctl` adapter
pub struct Systemctl {
    program: String,
    timeout: Duration,
}

impl Systemctl {
    pub fn new(timeout: Duration) -> Self {
        Self::with_program("systemctl", timeout)
    }

    /// Use a different binary (e.g. `systemctl --user` wrappers)
    pub fn with_program(program: &str, timeout: Duration) -> Self {
        Self {
            program: program.to_string(),
            timeout,
        }
    }

    async fn run(&self, args: &[&str]) -> Result<std::process::Output, LifecycleError> {
        debug!("Running {} {:?}", self.program, args);
        let mut command = Command::new(&self.program);
        command.args(args);
        run_with_timeout(&mut command, self.timeout)
            .await
            .map_err(|e| LifecycleError::from_io(&self.program, e, self.timeout.as_secs()))
    }
}

#[async_trait]
impl ServiceSupervisor for Systemctl {
    async fn is_active(&self, unit: &str) -> Result<String, LifecycleError> {
        // is-active exits non-zero for anything but "active"; the state is on stdout either way
        let output = self.run(&["is-active", unit]).await?;
        let state = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if state.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Ok(if stderr.is_empty() {
                "unknown".to_string()
            } else {
                stderr
            });
        }
        Ok(state)
    }

    async fn restart(&self, unit: &str) -> Result<(), LifecycleError> {
        let output = self.run(&["restart", unit]).await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(LifecycleError::NonZeroExit {
                program: self.program.clone(),
                code: output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    /// Fake `systemctl` that echoes a fixed state and fails restarts of `broken.service`
    fn fake_systemctl(dir: &TempDir) -> String {
        let path = dir.path().join("systemctl");
        std::fs::write(
            &path,
            "#!/bin/sh\n\
             case \"$1\" in\n\
               is-active) echo inactive; exit 3 ;;\n\
               restart) if [ \"$2\" = broken.service ]; then echo 'Unit broken.service not found.' >&2; exit 5; fi; exit 0 ;;\n\
             esac\n",
        )
        .unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn test_is_active_reports_stdout_despite_exit_code() {
        let dir = TempDir::new().unwrap();
        let systemctl = Systemctl::with_program(&fake_systemctl(&dir), Duration::from_secs(5));
        assert_eq!(systemctl.is_active("alpha.service").await.unwrap(), "inactive");
    }

    #[tokio::test]
    async fn test_restart_failure_carries_stderr() {
        let dir = TempDir::new().unwrap();
        let systemctl = Systemctl::with_program(&fake_systemctl(&dir), Duration::from_secs(5));
        assert!(systemctl.restart("alpha.service").await.is_ok());

        let err = systemctl.restart("broken.service").await.unwrap_err();
        assert!(err.to_string().contains("Unit broken.service not found."));
    }

    #[tokio::test]
    async fn test_missing_binary_is_command_error() {
        let systemctl =
            Systemctl::with_program("/nonexistent/systemctl", Duration::from_secs(5));
        assert!(matches!(
            systemctl.is_active("alpha.service").await,
            Err(LifecycleError::Command { .. })
        ));
    }
}
