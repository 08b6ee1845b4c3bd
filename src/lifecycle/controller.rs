//! Status Prober and Lifecycle Controller
//!
//! Branches on the record's backend once, through [`LifecycleController::lifecycle_for`].

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::LifecycleConfig;
use crate::lifecycle::process::{HostProcesses, ProcessHost, SpawnSpec};
use crate::lifecycle::supervisor::{ServiceSupervisor, Systemctl};
use crate::lifecycle::traits::{Lifecycle, Outcome};
use crate::registry::{AppTarget, ApplicationRecord, Backend, Registry};

/// Externally-supervised backend
pub struct SupervisedLifecycle {
    supervisor: Arc<dyn ServiceSupervisor>,
    unit_suffix: String,
}

impl SupervisedLifecycle {
    pub fn new(supervisor: Arc<dyn ServiceSupervisor>, unit_suffix: &str) -> Self {
        Self {
            supervisor,
            unit_suffix: unit_suffix.to_string(),
        }
    }
}

#[async_trait]
impl Lifecycle for SupervisedLifecycle {
    async fn probe(&self, alias: &str) -> String {
        let unit = format!("{}{}", alias, self.unit_suffix);
        match self.supervisor.is_active(&unit).await {
            Ok(state) => state,
            Err(e) => {
                warn!("Status query for {} failed: {}", unit, e);
                format!("error: {}", e)
            }
        }
    }

    async fn restart(&self, target: &AppTarget) -> Outcome {
        let unit = target.unit_name(&self.unit_suffix);
        match self.supervisor.restart(&unit).await {
            Ok(()) => {
                info!("Requested restart of {}", unit);
                Outcome::done(format!("systemd restarted {}", target.alias))
            }
            Err(e) => {
                warn!("Restart request for {} failed: {}", unit, e);
                Outcome::error(format!("systemd restart of {} failed: {}", target.alias, e))
            }
        }
    }
}

/// Self-managed backend
///
/// Liveness is not verified: `probe` always reports `manual`. Restart is
/// kill-by-command-line followed by an unconditional detached spawn; neither
/// step is checked afterwards, so a process that ignores SIGTERM can end up
/// running next to the new one.
pub struct ManualLifecycle {
    host: Arc<dyn ProcessHost>,
    interpreter: String,
}

impl ManualLifecycle {
    pub fn new(host: Arc<dyn ProcessHost>, interpreter: &str) -> Self {
        Self {
            host,
            interpreter: interpreter.to_string(),
        }
    }
}

#[async_trait]
impl Lifecycle for ManualLifecycle {
    async fn probe(&self, _alias: &str) -> String {
        "manual".to_string()
    }

    async fn restart(&self, target: &AppTarget) -> Outcome {
        let pattern = target.entry_path().to_string_lossy().into_owned();
        let terminated = self.host.terminate_matching(&pattern);
        debug!("Signalled {} process(es) matching {}", terminated, pattern);

        let spec = SpawnSpec::for_target(target, &self.interpreter);
        match self.host.spawn_detached(&spec) {
            Ok(_) => Outcome::done(format!("spawned {}", target.alias)),
            Err(e) => {
                warn!("Spawn of {} failed: {}", target.alias, e);
                Outcome::error(format!("spawn of {} failed: {}", target.alias, e))
            }
        }
    }
}

/// Probes and restarts registry entries, dispatching on backend
pub struct LifecycleController {
    supervised: SupervisedLifecycle,
    manual: ManualLifecycle,
}

impl LifecycleController {
    pub fn new(
        supervisor: Arc<dyn ServiceSupervisor>,
        host: Arc<dyn ProcessHost>,
        config: &LifecycleConfig,
    ) -> Self {
        Self {
            supervised: SupervisedLifecycle::new(supervisor, &config.unit_suffix),
            manual: ManualLifecycle::new(host, &config.interpreter),
        }
    }

    /// Controller backed by `systemctl` and the host process table
    pub fn from_config(config: &LifecycleConfig) -> Self {
        Self::new(
            Arc::new(Systemctl::new(config.supervisor_timeout())),
            Arc::new(HostProcesses::new()),
            config,
        )
    }

    fn lifecycle_for(&self, backend: Backend) -> &dyn Lifecycle {
        match backend {
            Backend::Systemd => &self.supervised,
            Backend::Manual => &self.manual,
        }
    }

    /// Live state of one application
    pub async fn probe(&self, record: &ApplicationRecord) -> String {
        if !record.is_well_formed() {
            return "error: bad record".to_string();
        }
        self.lifecycle_for(record.backend).probe(&record.alias).await
    }

    /// Restart one application; malformed records are reported, not acted on
    pub async fn restart(&self, record: &ApplicationRecord) -> Outcome {
        match record.validate() {
            Ok(target) => self.lifecycle_for(target.backend).restart(&target).await,
            Err(_) => Outcome::error("bad record"),
        }
    }

    /// `(alias, state)` for every registry entry, in registry order
    pub async fn status_all(&self, registry: &Registry) -> Vec<(String, String)> {
        let mut states = Vec::with_capacity(registry.len());
        for record in registry.iter() {
            states.push((record.alias.clone(), self.probe(record).await));
        }
        states
    }
}
