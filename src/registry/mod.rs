//! Registry Model
//!
//! The registry is the single source of truth for application identity and
//! backend selection. It is re-read on every invocation and never cached.

pub mod loader;
pub mod record;

use std::path::PathBuf;
use thiserror::Error;

pub use loader::RegistrySource;
pub use record::{AppTarget, ApplicationRecord, Backend};

/// Registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry source missing: {0}")]
    SourceMissing(PathBuf),
    #[error("registry source unreadable: {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },
    #[error("registry document invalid: {0}")]
    Parse(String),
    #[error("{0}: bad record")]
    MalformedRecord(String),
    #[error("unknown app: {0}")]
    UnknownAlias(String),
}

/// Declared application set, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    apps: Vec<ApplicationRecord>,
}

impl Registry {
    pub fn new(apps: Vec<ApplicationRecord>) -> Self {
        Self { apps }
    }

    pub fn get(&self, alias: &str) -> Option<&ApplicationRecord> {
        self.apps.iter().find(|a| a.alias == alias)
    }

    /// Look up an alias, reporting an unknown target as an error
    pub fn require(&self, alias: &str) -> Result<&ApplicationRecord, RegistryError> {
        self.get(alias)
            .ok_or_else(|| RegistryError::UnknownAlias(alias.to_string()))
    }

    pub fn aliases(&self) -> Vec<String> {
        self.apps.iter().map(|a| a.alias.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ApplicationRecord> {
        self.apps.iter()
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}
