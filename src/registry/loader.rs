//! Registry loading
//!
//! Reads the YAML registry document. `load` fails soft (absent, unreadable or
//! invalid documents yield an empty registry); `load_required` is for callers
//! that need the source to exist.

use serde_yaml::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::registry::record::{ApplicationRecord, RawRecord};
use crate::registry::{Registry, RegistryError};

/// Registry document on disk
#[derive(Debug, Clone)]
pub struct RegistrySource {
    path: PathBuf,
}

impl RegistrySource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the registry, treating any failure as "no applications"
    pub fn load(&self) -> Registry {
        match self.load_required() {
            Ok(registry) => registry,
            Err(RegistryError::SourceMissing(path)) => {
                debug!("Registry {:?} not found, no applications declared", path);
                Registry::default()
            }
            Err(e) => {
                warn!("Registry read error, treating as empty: {}", e);
                Registry::default()
            }
        }
    }

    /// Load the registry, reporting a missing or invalid source as an error
    pub fn load_required(&self) -> Result<Registry, RegistryError> {
        if !self.path.exists() {
            return Err(RegistryError::SourceMissing(self.path.clone()));
        }
        let contents =
            std::fs::read_to_string(&self.path).map_err(|e| RegistryError::Unreadable {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        parse_registry(&contents)
    }
}

/// Parse a registry document
///
/// An empty document is an empty registry. Entries whose value cannot be
/// decoded are kept as malformed records so they are reported, not dropped.
pub fn parse_registry(contents: &str) -> Result<Registry, RegistryError> {
    let document: Value =
        serde_yaml::from_str(contents).map_err(|e| RegistryError::Parse(e.to_string()))?;

    let mapping = match document {
        Value::Null => return Ok(Registry::default()),
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(RegistryError::Parse(format!(
                "expected a mapping of alias to record, found {}",
                value_kind(&other)
            )))
        }
    };

    let mut apps = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let alias = match key {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => {
                warn!("Skipping registry key of kind {}", value_kind(&other));
                continue;
            }
        };

        let record = match value {
            Value::Null => ApplicationRecord::malformed(alias),
            value => match serde_yaml::from_value::<RawRecord>(value) {
                Ok(raw) => ApplicationRecord::from_raw(alias, raw),
                Err(e) => {
                    debug!("Registry entry {} could not be decoded: {}", alias, e);
                    ApplicationRecord::malformed(alias)
                }
            },
        };
        apps.push(record);
    }

    Ok(Registry::new(apps))
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
