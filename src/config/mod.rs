//! Configuration management for fleetkeeper
//!
//! Every component receives its paths and limits from a `FleetConfig` passed
//! at construction time; nothing reads a fixed well-known path on its own.
//! Secrets for the usage monitor come from the environment, never from this file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils::{
    env_opt, DEFAULT_HTTP_TIMEOUT, DEFAULT_NOTIFY_TIMEOUT, DEFAULT_PULL_TIMEOUT,
    DEFAULT_SUPERVISOR_TIMEOUT,
};

/// Environment variable naming a config file when `--config` is not given
pub const CONFIG_ENV: &str = "FLEETKEEPER_CONFIG";
/// Environment override for the registry path
pub const REGISTRY_ENV: &str = "FLEETKEEPER_REGISTRY";
/// Environment override for the state directory
pub const STATE_DIR_ENV: &str = "FLEETKEEPER_STATE_DIR";

/// Top-level supervisor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    /// Registry document (alias -> {path, entry, backend})
    #[serde(default = "default_registry_path")]
    pub registry_path: PathBuf,

    /// Directory holding the audit log, alert log and usage history
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    /// Audit log override (defaults to `<state_dir>/bridge_activity.log`)
    #[serde(default)]
    pub audit_log: Option<PathBuf>,

    /// Health snapshot override (defaults to `<state_dir>/summary.json`)
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    /// Optional dotenv file loaded by the usage monitor before reading secrets
    #[serde(default)]
    pub env_file: Option<PathBuf>,

    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    #[serde(default)]
    pub update: UpdateConfig,

    #[serde(default)]
    pub integrity: IntegrityConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_registry_path() -> PathBuf {
    PathBuf::from("/etc/fleetkeeper/registry.yml")
}

fn default_state_dir() -> PathBuf {
    PathBuf::from("/var/log/fleetkeeper")
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            registry_path: default_registry_path(),
            state_dir: default_state_dir(),
            audit_log: None,
            snapshot_path: None,
            env_file: None,
            lifecycle: LifecycleConfig::default(),
            update: UpdateConfig::default(),
            integrity: IntegrityConfig::default(),
            telemetry: TelemetryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Lifecycle controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Interpreter used to launch self-managed entry points (empty = run entry directly)
    #[serde(default = "default_interpreter")]
    pub interpreter: String,

    /// Suffix appended to an alias to form the supervisor unit name
    #[serde(default = "default_unit_suffix")]
    pub unit_suffix: String,

    /// Timeout for `is-active` and `restart` requests to the external supervisor
    #[serde(default = "default_supervisor_timeout")]
    pub supervisor_timeout_seconds: u64,
}

fn default_interpreter() -> String {
    "python3".to_string()
}

fn default_unit_suffix() -> String {
    ".service".to_string()
}

fn default_supervisor_timeout() -> u64 {
    DEFAULT_SUPERVISOR_TIMEOUT.as_secs()
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            unit_suffix: default_unit_suffix(),
            supervisor_timeout_seconds: default_supervisor_timeout(),
        }
    }
}

impl LifecycleConfig {
    pub fn supervisor_timeout(&self) -> Duration {
        Duration::from_secs(self.supervisor_timeout_seconds)
    }
}

/// Update orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// Timeout for the fast-forward pull
    #[serde(default = "default_pull_timeout")]
    pub pull_timeout_seconds: u64,
}

fn default_pull_timeout() -> u64 {
    DEFAULT_PULL_TIMEOUT.as_secs()
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            pull_timeout_seconds: default_pull_timeout(),
        }
    }
}

impl UpdateConfig {
    pub fn pull_timeout(&self) -> Duration {
        Duration::from_secs(self.pull_timeout_seconds)
    }
}

/// Integrity self-healer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityConfig {
    /// Memory utilization (percent) at or above which the server is "High Load"
    #[serde(default = "default_high_load_memory_percent")]
    pub high_load_memory_percent: f64,
}

fn default_high_load_memory_percent() -> f64 {
    85.0
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            high_load_memory_percent: default_high_load_memory_percent(),
        }
    }
}

/// Telemetry & alert recorder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Period-to-date metered usage endpoint
    #[serde(default = "default_usage_endpoint")]
    pub usage_endpoint: String,

    /// Chat notifier base URL (bot token and method are appended)
    #[serde(default = "default_notifier_endpoint")]
    pub notifier_endpoint: String,

    /// Fraction of the prepaid ceiling at which a threshold alert is raised
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: f64,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    #[serde(default = "default_notify_timeout")]
    pub notify_timeout_seconds: u64,
}

fn default_usage_endpoint() -> String {
    "https://api.openai.com/v1/usage".to_string()
}

fn default_notifier_endpoint() -> String {
    "https://api.telegram.org".to_string()
}

fn default_alert_threshold() -> f64 {
    0.80
}

fn default_request_timeout() -> u64 {
    DEFAULT_HTTP_TIMEOUT.as_secs()
}

fn default_notify_timeout() -> u64 {
    DEFAULT_NOTIFY_TIMEOUT.as_secs()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            usage_endpoint: default_usage_endpoint(),
            notifier_endpoint: default_notifier_endpoint(),
            alert_threshold: default_alert_threshold(),
            request_timeout_seconds: default_request_timeout(),
            notify_timeout_seconds: default_notify_timeout(),
        }
    }
}

impl TelemetryConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify_timeout_seconds)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter (e.g. "info", "fleetkeeper::lifecycle=debug"); RUST_LOG wins
    #[serde(default)]
    pub filter: Option<String>,

    /// Emit JSON log lines (requires the `json-logging` feature)
    #[serde(default)]
    pub json_format: bool,
}

impl FleetConfig {
    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
        let config: FleetConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Resolve configuration for a binary invocation
    ///
    /// Uses `explicit` if given, else the file named by `FLEETKEEPER_CONFIG`,
    /// else built-in defaults; then applies environment overrides and validates.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let from_env = env_opt(CONFIG_ENV).map(PathBuf::from);
        let mut config = match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::from_toml_file(&path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `FLEETKEEPER_REGISTRY` / `FLEETKEEPER_STATE_DIR` overrides
    pub fn apply_env_overrides(&mut self) {
        if let Some(registry) = env_opt(REGISTRY_ENV) {
            self.registry_path = PathBuf::from(registry);
        }
        if let Some(state_dir) = env_opt(STATE_DIR_ENV) {
            self.state_dir = PathBuf::from(state_dir);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        let threshold = self.telemetry.alert_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(anyhow::anyhow!(
                "telemetry.alert_threshold must be in (0, 1], got {}",
                threshold
            ));
        }

        let high_load = self.integrity.high_load_memory_percent;
        if !(high_load > 0.0 && high_load <= 100.0) {
            return Err(anyhow::anyhow!(
                "integrity.high_load_memory_percent must be in (0, 100], got {}",
                high_load
            ));
        }

        if self.lifecycle.supervisor_timeout_seconds == 0
            || self.update.pull_timeout_seconds == 0
            || self.telemetry.request_timeout_seconds == 0
            || self.telemetry.notify_timeout_seconds == 0
        {
            return Err(anyhow::anyhow!("timeouts must be greater than 0 seconds"));
        }

        Ok(())
    }

    /// Append-only update audit log
    pub fn audit_log_path(&self) -> PathBuf {
        self.audit_log
            .clone()
            .unwrap_or_else(|| self.state_dir.join("bridge_activity.log"))
    }

    /// Append-only alert log
    pub fn alerts_log_path(&self) -> PathBuf {
        self.state_dir.join("alerts.log")
    }

    /// Usage history document
    pub fn usage_history_path(&self) -> PathBuf {
        self.state_dir.join("usage_log.json")
    }

    /// Health snapshot document read by the dashboard
    pub fn snapshot_path(&self) -> PathBuf {
        self.snapshot_path
            .clone()
            .unwrap_or_else(|| self.state_dir.join("summary.json"))
    }
}
