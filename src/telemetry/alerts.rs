//! Append-only alert log, one `<utc-timestamp> | <message>` line per alert

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::utils::iso_timestamp;

#[derive(Debug, Clone)]
pub struct AlertLog {
    path: PathBuf,
}

impl AlertLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an alert; returns the line written
    pub fn append(&self, message: &str) -> std::io::Result<String> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let line = format!("{} | {}", iso_timestamp(), message.replace('\n', " "));
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(line)
    }

    /// Last `n` alert lines, newest first
    pub fn recent(&self, n: usize) -> Vec<String> {
        let content = match std::fs::read(&self.path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(_) => return Vec::new(),
        };
        content
            .lines()
            .rev()
            .take(n)
            .map(str::to_string)
            .collect()
    }
}
