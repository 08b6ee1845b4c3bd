//! Update Orchestrator
//!
//! Pull-then-restart for one application or the whole registry. The restart
//! always runs, whatever the pull did, so a failed pull never leaves a stale
//! process stuck; the existing code is re-launched instead.

pub mod audit;
pub mod vcs;

use std::sync::Arc;
use tracing::{info, warn};

pub use audit::AuditLog;
pub use vcs::{GitPuller, SourcePuller};

use crate::config::FleetConfig;
use crate::lifecycle::{LifecycleController, Outcome};
use crate::registry::{ApplicationRecord, Registry, RegistryError};
use crate::utils::log_error;

/// Result of updating one application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub alias: String,
    pub pull: Outcome,
    pub restart: Outcome,
}

impl UpdateReport {
    /// `alias: <pull> | <restart>` on a single line
    pub fn line(&self) -> String {
        format!("{}: {} | {}", self.alias, self.pull, self.restart).replace('\n', " / ")
    }
}

pub struct UpdateOrchestrator {
    controller: LifecycleController,
    puller: Arc<dyn SourcePuller>,
    audit: AuditLog,
}

impl UpdateOrchestrator {
    pub fn new(
        controller: LifecycleController,
        puller: Arc<dyn SourcePuller>,
        audit: AuditLog,
    ) -> Self {
        Self {
            controller,
            puller,
            audit,
        }
    }

    /// Orchestrator using git, systemctl and the host process table
    pub fn from_config(config: &FleetConfig) -> Self {
        Self::new(
            LifecycleController::from_config(&config.lifecycle),
            Arc::new(GitPuller::new(config.update.pull_timeout())),
            AuditLog::new(config.audit_log_path()),
        )
    }

    /// Update one alias; an unknown alias is an error and writes no audit line
    pub async fn update_one(
        &self,
        registry: &Registry,
        alias: &str,
    ) -> Result<UpdateReport, RegistryError> {
        let record = registry.require(alias)?;
        Ok(self.update_record(record).await)
    }

    /// Update every alias in registry order, one fully before the next
    ///
    /// `on_report` is called as each application completes.
    pub async fn update_all<F>(&self, registry: &Registry, mut on_report: F) -> Vec<UpdateReport>
    where
        F: FnMut(&UpdateReport),
    {
        let mut reports = Vec::with_capacity(registry.len());
        for record in registry.iter() {
            let report = self.update_record(record).await;
            on_report(&report);
            reports.push(report);
        }
        reports
    }

    async fn update_record(&self, record: &ApplicationRecord) -> UpdateReport {
        let (pull, restart) = match record.validate() {
            Ok(target) => {
                let pull = self.pull(&target.path).await;
                let restart = self.controller.restart(record).await;
                (pull, restart)
            }
            Err(e) => {
                warn!("{}", e);
                (Outcome::skipped("bad record"), Outcome::error("bad record"))
            }
        };

        let report = UpdateReport {
            alias: record.alias.clone(),
            pull,
            restart,
        };
        let line = report.line();
        info!("{}", line);
        log_error(|| self.audit.append(&line), "Failed to append audit log");
        report
    }

    async fn pull(&self, path: &std::path::Path) -> Outcome {
        if !path.is_dir() {
            return Outcome::skipped("missing path");
        }
        if !self.puller.is_working_copy(path) {
            return Outcome::skipped("not a git repo");
        }
        self.puller.fast_forward(path).await
    }
}
