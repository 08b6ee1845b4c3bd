//! Self-managed process handling
//!
//! No pid is persisted between runs. A running instance is found by matching
//! its command line against the application's resolved entry path at restart
//! time, so a coincidental substring match in an unrelated process's command
//! line will also be terminated. New instances are spawned detached, with
//! standard streams redirected away from the controller, and are not tracked.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use sysinfo::{ProcessRefreshKind, System, UpdateKind};
use tracing::{debug, info, warn};

use crate::lifecycle::traits::LifecycleError;
use crate::registry::AppTarget;

/// What to launch for a self-managed application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl SpawnSpec {
    /// Launch spec for `target`, run through `interpreter` unless it is empty
    ///
    /// The entry is passed as its full path so the command line of the spawned
    /// process contains the pattern used to find it on the next restart.
    pub fn for_target(target: &AppTarget, interpreter: &str) -> Self {
        let entry_path = target.entry_path().to_string_lossy().into_owned();
        let interpreter = target.interpreter.as_deref().unwrap_or(interpreter);
        if interpreter.trim().is_empty() {
            Self {
                program: entry_path,
                args: Vec::new(),
                cwd: target.path.clone(),
            }
        } else {
            Self {
                program: interpreter.to_string(),
                args: vec![entry_path],
                cwd: target.path.clone(),
            }
        }
    }
}

/// Process table operations used by the self-managed backend
pub trait ProcessHost: Send + Sync {
    /// Signal every process whose command line contains `pattern`; returns how many were signalled
    fn terminate_matching(&self, pattern: &str) -> usize;

    /// Start a detached process; returns its pid
    fn spawn_detached(&self, spec: &SpawnSpec) -> Result<u32, LifecycleError>;
}

/// The real host process table
#[derive(Debug, Default)]
pub struct HostProcesses;

impl HostProcesses {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessHost for HostProcesses {
    fn terminate_matching(&self, pattern: &str) -> usize {
        if pattern.is_empty() {
            return 0;
        }

        // Command lines are not part of the default process refresh
        let mut system = System::new();
        system.refresh_processes_specifics(ProcessRefreshKind::new().with_cmd(UpdateKind::Always));
        let own_pid = sysinfo::get_current_pid().ok();

        let mut signalled = 0;
        for (pid, process) in system.processes() {
            if Some(*pid) == own_pid {
                continue;
            }
            let cmdline = process.cmd().join(" ");
            if !cmdline.contains(pattern) {
                continue;
            }
            debug!("Terminating pid {} ({})", pid, cmdline);
            if send_terminate(pid.as_u32(), process) {
                signalled += 1;
            } else {
                warn!("Failed to signal pid {} matching {}", pid, pattern);
            }
        }
        signalled
    }

    fn spawn_detached(&self, spec: &SpawnSpec) -> Result<u32, LifecycleError> {
        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .current_dir(&spec.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // New session: no controlling terminal, so no SIGHUP when the
        // controller's terminal goes away
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // SAFETY: setsid is async-signal-safe and touches no parent state
            unsafe {
                command.pre_exec(|| {
                    nix::unistd::setsid()
                        .map(|_| ())
                        .map_err(std::io::Error::from)
                });
            }
        }

        let child = command.spawn().map_err(|e| LifecycleError::Spawn {
            program: spec.program.clone(),
            reason: e.to_string(),
        })?;
        let pid = child.id();
        info!("Spawned {} {:?} as pid {}", spec.program, spec.args, pid);
        // The child is intentionally not waited on
        drop(child);
        Ok(pid)
    }
}

#[cfg(unix)]
fn send_terminate(pid: u32, _process: &sysinfo::Process) -> bool {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    match i32::try_from(pid) {
        Ok(raw) => kill(Pid::from_raw(raw), Signal::SIGTERM).is_ok(),
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn send_terminate(_pid: u32, process: &sysinfo::Process) -> bool {
    process.kill()
}
