#![allow(dead_code)]

use async_trait::async_trait;
use fleetkeeper::config::LifecycleConfig;
use fleetkeeper::integrity::{ResourceProbe, ResourceUsage};
use fleetkeeper::lifecycle::{
    LifecycleController, LifecycleError, Outcome, ProcessHost, ServiceSupervisor, SpawnSpec,
};
use fleetkeeper::registry::RegistrySource;
use fleetkeeper::telemetry::{Notifier, UsageFetchError, UsageSource};
use fleetkeeper::update::SourcePuller;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Scratch directory holding a registry file and application trees
pub struct TempFleet {
    pub temp_dir: TempDir,
}

impl TempFleet {
    pub fn new() -> Self {
        TempFleet {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn registry_path(&self) -> PathBuf {
        self.root().join("registry.yml")
    }

    pub fn write_registry(&self, yaml: &str) -> RegistrySource {
        std::fs::write(self.registry_path(), yaml).unwrap();
        RegistrySource::new(self.registry_path())
    }

    /// Application directory with an entry file, returned as its path
    pub fn app_dir(&self, name: &str, entry: &str) -> PathBuf {
        let dir = self.root().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(entry), "print('hi')\n").unwrap();
        dir
    }
}

/// Service manager that reports a fixed state and records every call
pub struct FakeSupervisor {
    pub state: String,
    pub fail_restart: bool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeSupervisor {
    pub fn new(state: &str) -> Arc<Self> {
        Arc::new(FakeSupervisor {
            state: state.to_string(),
            fail_restart: false,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(FakeSupervisor {
            state: "failed".to_string(),
            fail_restart: true,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ServiceSupervisor for FakeSupervisor {
    async fn is_active(&self, unit: &str) -> Result<String, LifecycleError> {
        self.calls.lock().unwrap().push(format!("is-active {}", unit));
        Ok(self.state.clone())
    }

    async fn restart(&self, unit: &str) -> Result<(), LifecycleError> {
        self.calls.lock().unwrap().push(format!("restart {}", unit));
        if self.fail_restart {
            return Err(LifecycleError::NonZeroExit {
                program: "systemctl".to_string(),
                code: "5".to_string(),
                stderr: format!("Unit {} not found.", unit),
            });
        }
        Ok(())
    }
}

/// Process table double: `matches` processes match any pattern
pub struct FakeProcessHost {
    pub matches: usize,
    pub fail_spawn: bool,
    pub terminated: Mutex<Vec<String>>,
    pub spawned: Mutex<Vec<SpawnSpec>>,
}

impl FakeProcessHost {
    pub fn new(matches: usize) -> Arc<Self> {
        Arc::new(FakeProcessHost {
            matches,
            fail_spawn: false,
            terminated: Mutex::new(Vec::new()),
            spawned: Mutex::new(Vec::new()),
        })
    }

    pub fn failing_spawn() -> Arc<Self> {
        Arc::new(FakeProcessHost {
            matches: 0,
            fail_spawn: true,
            terminated: Mutex::new(Vec::new()),
            spawned: Mutex::new(Vec::new()),
        })
    }

    pub fn terminated(&self) -> Vec<String> {
        self.terminated.lock().unwrap().clone()
    }

    pub fn spawned(&self) -> Vec<SpawnSpec> {
        self.spawned.lock().unwrap().clone()
    }
}

impl ProcessHost for FakeProcessHost {
    fn terminate_matching(&self, pattern: &str) -> usize {
        self.terminated.lock().unwrap().push(pattern.to_string());
        self.matches
    }

    fn spawn_detached(&self, spec: &SpawnSpec) -> Result<u32, LifecycleError> {
        if self.fail_spawn {
            return Err(LifecycleError::Spawn {
                program: spec.program.clone(),
                reason: "No such file or directory".to_string(),
            });
        }
        let mut spawned = self.spawned.lock().unwrap();
        spawned.push(spec.clone());
        Ok(40_000 + spawned.len() as u32)
    }
}

/// Controller over the given fakes with default lifecycle settings
pub fn fake_controller(
    supervisor: &Arc<FakeSupervisor>,
    host: &Arc<FakeProcessHost>,
) -> LifecycleController {
    LifecycleController::new(
        supervisor.clone() as Arc<dyn ServiceSupervisor>,
        host.clone() as Arc<dyn ProcessHost>,
        &LifecycleConfig::default(),
    )
}

/// VCS double; every path containing a `.git` entry is a working copy
pub struct FakePuller {
    pub result: Outcome,
    pub pulled: Mutex<Vec<PathBuf>>,
}

impl FakePuller {
    pub fn new(result: Outcome) -> Arc<Self> {
        Arc::new(FakePuller {
            result,
            pulled: Mutex::new(Vec::new()),
        })
    }

    pub fn pulled(&self) -> Vec<PathBuf> {
        self.pulled.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourcePuller for FakePuller {
    fn is_working_copy(&self, path: &Path) -> bool {
        path.join(".git").exists()
    }

    async fn fast_forward(&self, path: &Path) -> Outcome {
        self.pulled.lock().unwrap().push(path.to_path_buf());
        self.result.clone()
    }
}

/// Usage source returning a fixed amount, or HTTP 503 when `None`
pub struct StubUsageSource {
    pub amount: Option<f64>,
}

#[async_trait]
impl UsageSource for StubUsageSource {
    async fn period_to_date(&self) -> Result<f64, UsageFetchError> {
        self.amount.ok_or(UsageFetchError::Status(503))
    }
}

/// Notifier that keeps every message it is handed
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub sent: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, text: &str) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Resource probe with a fixed reading
pub struct FixedProbe(pub ResourceUsage);

impl FixedProbe {
    pub fn boxed(cpu_percent: f64, memory_percent: f64) -> Box<dyn ResourceProbe> {
        Box::new(FixedProbe(ResourceUsage {
            cpu_percent,
            memory_percent,
        }))
    }
}

impl ResourceProbe for FixedProbe {
    fn sample(&self) -> ResourceUsage {
        self.0
    }
}
