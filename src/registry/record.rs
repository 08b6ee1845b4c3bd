//! Registry entries
//!
//! An entry is keyed by its alias and names the directory the application runs
//! from, its entry point, and which lifecycle backend manages it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::registry::RegistryError;

/// Lifecycle backend of an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Start/stop/liveness delegated to the external supervisor (systemd)
    #[serde(alias = "externally-supervised")]
    Systemd,
    /// Spawned and killed directly by fleetkeeper, no supervisor
    #[default]
    #[serde(alias = "self-managed")]
    Manual,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Systemd => write!(f, "systemd"),
            Backend::Manual => write!(f, "manual"),
        }
    }
}

/// Entry as written in the registry document
///
/// Every field is optional here so that one bad entry never fails the whole
/// document; completeness is checked by [`ApplicationRecord::validate`].
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawRecord {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub entry: Option<String>,
    /// Legacy boolean backend flag
    #[serde(default)]
    pub systemd: bool,
    /// Explicit backend; wins over `systemd` when both are present
    #[serde(default)]
    pub backend: Option<Backend>,
    #[serde(default)]
    pub interpreter: Option<String>,
}

/// One application declared in the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationRecord {
    pub alias: String,
    pub path: Option<PathBuf>,
    pub entry: Option<String>,
    pub backend: Backend,
    /// Per-application interpreter override for self-managed entry points
    pub interpreter: Option<String>,
}

/// A record that has both `path` and `entry` and may be acted upon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppTarget {
    pub alias: String,
    pub path: PathBuf,
    pub entry: String,
    pub backend: Backend,
    pub interpreter: Option<String>,
}

impl ApplicationRecord {
    pub(crate) fn from_raw(alias: String, raw: RawRecord) -> Self {
        let backend = raw.backend.unwrap_or(if raw.systemd {
            Backend::Systemd
        } else {
            Backend::Manual
        });
        Self {
            alias,
            path: raw.path.filter(|p| !p.trim().is_empty()).map(PathBuf::from),
            entry: raw.entry.filter(|e| !e.trim().is_empty()),
            backend,
            interpreter: raw.interpreter,
        }
    }

    /// Record with no usable fields, used when an entry's value cannot be decoded
    pub(crate) fn malformed(alias: String) -> Self {
        Self::from_raw(alias, RawRecord::default())
    }

    pub fn new(alias: &str, path: impl Into<PathBuf>, entry: &str, backend: Backend) -> Self {
        Self {
            alias: alias.to_string(),
            path: Some(path.into()),
            entry: Some(entry.to_string()),
            backend,
            interpreter: None,
        }
    }

    /// Whether both `path` and `entry` are present
    pub fn is_well_formed(&self) -> bool {
        self.path.is_some() && self.entry.is_some()
    }

    /// Check the record is actionable
    pub fn validate(&self) -> Result<AppTarget, RegistryError> {
        match (&self.path, &self.entry) {
            (Some(path), Some(entry)) => Ok(AppTarget {
                alias: self.alias.clone(),
                path: path.clone(),
                entry: entry.clone(),
                backend: self.backend,
                interpreter: self.interpreter.clone(),
            }),
            _ => Err(RegistryError::MalformedRecord(self.alias.clone())),
        }
    }
}

impl AppTarget {
    /// `path/entry`, the command-line fragment used to find the running process
    pub fn entry_path(&self) -> PathBuf {
        self.path.join(&self.entry)
    }

    /// Supervisor unit name for this application
    pub fn unit_name(&self, suffix: &str) -> String {
        format!("{}{}", self.alias, suffix)
    }

    pub fn working_dir(&self) -> &Path {
        &self.path
    }
}
