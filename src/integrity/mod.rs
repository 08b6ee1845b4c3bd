//! Integrity Self-Healer
//!
//! Validates every registry entry and, in fix mode, repairs missing
//! directories, rewrites each entry point with a placeholder stub and
//! regenerates the health snapshot.
//!
//! Fix mode overwrites the entry point unconditionally on every pass. A
//! hand-written entry point at the same `path/entry` is replaced by the stub.

pub mod snapshot;

use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub use snapshot::{
    HealthSnapshot, HealthStatus, ResourceProbe, ResourceUsage, ServerHealth, SystemResources,
};

use crate::config::FleetConfig;
use crate::registry::{AppTarget, ApplicationRecord, RegistryError, RegistrySource};
use crate::utils::local_timestamp;

/// Exit status for a clean or warning-only pass
pub const EXIT_OK: i32 = 0;
/// Exit status for an unreadable or invalid registry
pub const EXIT_FAILURE: i32 = 1;
/// Exit status when the registry source is missing
pub const EXIT_REGISTRY_MISSING: i32 = 2;

/// Findings of one integrity pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegrityReport {
    /// Aliases with no findings
    pub ok: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    /// Snapshot written by a fix pass
    pub snapshot: Option<HealthSnapshot>,
    pub snapshot_path: Option<PathBuf>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }

    /// Operator-facing summary lines
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(path) = &self.snapshot_path {
            lines.push(format!("Snapshot updated: {}", path.display()));
        }
        lines.extend(self.warnings.iter().map(|w| format!("WARN {}", w)));
        lines.extend(self.errors.iter().map(|e| format!("ERROR {}", e)));
        if self.is_clean() {
            lines.push("All applications verified clean.".to_string());
        }
        lines
    }
}

/// Process exit status for the result of [`IntegrityChecker::verify`]
pub fn exit_status(result: &Result<IntegrityReport, RegistryError>) -> i32 {
    match result {
        Ok(_) => EXIT_OK,
        Err(RegistryError::SourceMissing(_)) => EXIT_REGISTRY_MISSING,
        Err(_) => EXIT_FAILURE,
    }
}

pub struct IntegrityChecker {
    source: RegistrySource,
    snapshot_path: PathBuf,
    high_load_memory_percent: f64,
    probe: Box<dyn ResourceProbe>,
}

impl IntegrityChecker {
    pub fn new(
        source: RegistrySource,
        snapshot_path: PathBuf,
        high_load_memory_percent: f64,
        probe: Box<dyn ResourceProbe>,
    ) -> Self {
        Self {
            source,
            snapshot_path,
            high_load_memory_percent,
            probe,
        }
    }

    pub fn from_config(config: &FleetConfig) -> Self {
        Self::new(
            RegistrySource::new(&config.registry_path),
            config.snapshot_path(),
            config.integrity.high_load_memory_percent,
            Box::new(SystemResources::new()),
        )
    }

    /// Run one pass
    ///
    /// A missing registry source fails before any entry is looked at.
    pub fn verify(&self, fix: bool) -> Result<IntegrityReport, RegistryError> {
        let registry = self.source.load_required()?;
        let mut report = IntegrityReport::default();

        for record in registry.iter() {
            self.check_record(record, fix, &mut report);
        }

        if fix {
            let snapshot = self.build_snapshot(registry.aliases(), &report);
            match snapshot.write_to(&self.snapshot_path) {
                Ok(()) => {
                    info!("Health snapshot written to {:?}", self.snapshot_path);
                    report.snapshot_path = Some(self.snapshot_path.clone());
                }
                Err(e) => {
                    warn!("Failed to write health snapshot: {}", e);
                    report.errors.push(format!(
                        "snapshot: cannot write {}: {}",
                        self.snapshot_path.display(),
                        e
                    ));
                }
            }
            report.snapshot = Some(snapshot);
        }

        Ok(report)
    }

    fn check_record(&self, record: &ApplicationRecord, fix: bool, report: &mut IntegrityReport) {
        let alias = &record.alias;
        let target = match record.validate() {
            Ok(target) => target,
            Err(_) => {
                report.errors.push(format!("{}: bad record", alias));
                return;
            }
        };

        let findings_before = report.warnings.len() + report.errors.len();

        if !target.path.is_dir() {
            if !fix {
                report
                    .errors
                    .push(format!("{}: missing dir {}", alias, target.path.display()));
                return;
            }
            if let Err(e) = std::fs::create_dir_all(&target.path) {
                report.errors.push(format!(
                    "{}: cannot create {}: {}",
                    alias,
                    target.path.display(),
                    e
                ));
                return;
            }
            report
                .warnings
                .push(format!("{}: created {}", alias, target.path.display()));
        }

        if fix {
            match write_entry_stub(&target) {
                Ok(()) => report
                    .warnings
                    .push(format!("{}: created entry {}", alias, target.entry)),
                Err(e) => report.errors.push(format!(
                    "{}: cannot write entry {}: {}",
                    alias, target.entry, e
                )),
            }
        } else if !target.entry_path().is_file() {
            report
                .errors
                .push(format!("{}: missing entry {}", alias, target.entry));
        }

        if report.warnings.len() + report.errors.len() == findings_before {
            report.ok.push(alias.clone());
        }
    }

    fn build_snapshot(&self, aliases: Vec<String>, report: &IntegrityReport) -> HealthSnapshot {
        let usage = self.probe.sample();
        HealthSnapshot {
            active_apps: aliases,
            server_health: ServerHealth {
                cpu: usage.cpu_percent,
                memory: usage.memory_percent,
                status: HealthStatus::classify(usage.memory_percent, self.high_load_memory_percent),
            },
            alerts: vec![
                format!(
                    "Integrity check executed successfully at {}",
                    local_timestamp()
                ),
                format!(
                    "{} warnings, {} errors",
                    report.warnings.len(),
                    report.errors.len()
                ),
            ],
        }
    }
}

/// Placeholder entry point identifying the application
pub fn entry_stub(alias: &str) -> String {
    format!(
        "# placeholder entry point for {alias}, regenerated by integrity-check --fix\n\
         if __name__ == '__main__':\n    print('{alias} ready')\n"
    )
}

fn write_entry_stub(target: &AppTarget) -> std::io::Result<()> {
    let entry_path = target.entry_path();
    if let Some(parent) = entry_path.parent() {
        ensure_dir(parent)?;
    }
    std::fs::write(&entry_path, entry_stub(&target.alias))
}

fn ensure_dir(dir: &Path) -> std::io::Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        std::fs::create_dir_all(dir)
    }
}
