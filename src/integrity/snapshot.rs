//! Health snapshot document
//!
//! Regenerated wholesale on every fix pass and read by the dashboard.

use serde::{Deserialize, Serialize};
use std::path::Path;
use sysinfo::System;

/// Coarse server health classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    #[serde(rename = "Healthy")]
    Healthy,
    #[serde(rename = "High Load")]
    HighLoad,
}

impl HealthStatus {
    /// "High Load" once memory utilization reaches `high_load_percent`
    pub fn classify(memory_percent: f64, high_load_percent: f64) -> Self {
        if memory_percent >= high_load_percent {
            HealthStatus::HighLoad
        } else {
            HealthStatus::Healthy
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerHealth {
    pub cpu: f64,
    pub memory: f64,
    pub status: HealthStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub active_apps: Vec<String>,
    pub server_health: ServerHealth,
    pub alerts: Vec<String>,
}

impl HealthSnapshot {
    /// Overwrite the snapshot file (never merged with a previous one)
    pub fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn read_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Point-in-time resource pressure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceUsage {
    pub cpu_percent: f64,
    pub memory_percent: f64,
}

/// Source of resource pressure readings
pub trait ResourceProbe: Send + Sync {
    fn sample(&self) -> ResourceUsage;
}

/// Readings from the local host via sysinfo
#[derive(Debug, Default)]
pub struct SystemResources;

impl SystemResources {
    pub fn new() -> Self {
        Self
    }
}

impl ResourceProbe for SystemResources {
    fn sample(&self) -> ResourceUsage {
        let mut system = System::new();
        system.refresh_memory();
        // CPU usage is a delta between two refreshes
        system.refresh_cpu();
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        system.refresh_cpu();

        let total = system.total_memory();
        let memory_percent = if total == 0 {
            0.0
        } else {
            system.used_memory() as f64 / total as f64 * 100.0
        };

        ResourceUsage {
            cpu_percent: round1(f64::from(system.global_cpu_info().cpu_usage())),
            memory_percent: round1(memory_percent),
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_threshold_inclusive() {
        assert_eq!(HealthStatus::classify(84.9, 85.0), HealthStatus::Healthy);
        assert_eq!(HealthStatus::classify(85.0, 85.0), HealthStatus::HighLoad);
        assert_eq!(HealthStatus::classify(99.0, 85.0), HealthStatus::HighLoad);
    }

    #[test]
    fn test_snapshot_document_shape() {
        let snapshot = HealthSnapshot {
            active_apps: vec!["alpha".to_string()],
            server_health: ServerHealth {
                cpu: 12.5,
                memory: 90.0,
                status: HealthStatus::HighLoad,
            },
            alerts: vec!["0 warnings, 0 errors".to_string()],
        };
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["active_apps"], serde_json::json!(["alpha"]));
        assert_eq!(value["server_health"]["status"], "High Load");
        assert_eq!(value["server_health"]["memory"], 90.0);
        assert_eq!(value["alerts"][0], "0 warnings, 0 errors");
    }

    #[test]
    fn test_system_sample_in_range() {
        let usage = SystemResources::new().sample();
        assert!((0.0..=100.0).contains(&usage.memory_percent));
        assert!(usage.cpu_percent >= 0.0);
    }
}
