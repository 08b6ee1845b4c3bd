//! Usage history
//!
//! An append-only JSON array of usage records. Each append re-reads the whole
//! file and rewrites it; the last element is the authoritative current usage.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::utils::iso_timestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// UTC ISO-8601; absent only on the zero record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub total_spend_usd: f64,
    pub credits_usd: f64,
    /// Percent (0-100+) of the ceiling used
    pub percent_used: f64,
}

impl UsageRecord {
    /// Record stamped now; `fraction_used` is 0..1 and stored as a percent
    pub fn new(spent: f64, credits: f64, fraction_used: f64) -> Self {
        Self {
            timestamp: Some(iso_timestamp()),
            total_spend_usd: round_to(spent, 4),
            credits_usd: credits,
            percent_used: round_to(fraction_used * 100.0, 2),
        }
    }

    /// Record reported when there is no history
    pub fn zero() -> Self {
        Self {
            timestamp: None,
            total_spend_usd: 0.0,
            credits_usd: 0.0,
            percent_used: 0.0,
        }
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[derive(Debug, Clone)]
pub struct UsageHistory {
    path: PathBuf,
}

impl UsageHistory {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where a history that cannot be decoded is moved before a new one starts
    pub fn corrupt_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".corrupt");
        self.path.with_file_name(name)
    }

    /// All records in order; absent, unreadable or undecodable history is empty
    pub fn load(&self) -> Vec<UsageRecord> {
        self.read().unwrap_or_else(|e| {
            warn!("Usage history {:?} unusable: {}", self.path, e);
            Vec::new()
        })
    }

    fn read(&self) -> anyhow::Result<Vec<UsageRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Append a record, rewriting the whole document
    ///
    /// A history that cannot be read back is moved to [`Self::corrupt_path`]
    /// (replacing any earlier one) and a new history starts with this record.
    pub fn append(&self, record: UsageRecord) -> anyhow::Result<()> {
        let mut history = match self.read() {
            Ok(history) => history,
            Err(e) => {
                let corrupt = self.corrupt_path();
                warn!(
                    "Usage history {:?} unusable ({}), moving it to {:?}",
                    self.path, e, corrupt
                );
                std::fs::rename(&self.path, &corrupt)?;
                Vec::new()
            }
        };
        history.push(record);
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&history)?)?;
        Ok(())
    }

    /// Most recent record, or the zero record
    pub fn latest(&self) -> UsageRecord {
        self.load().pop().unwrap_or_else(UsageRecord::zero)
    }
}
