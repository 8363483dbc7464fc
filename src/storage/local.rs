//! Local filesystem audit trail.
//!
//! Every successful run leaves one immutable JSON file behind. The file name
//! is the run's UTC timestamp with colons and the sub-second fraction
//! removed, so a plain lexicographic listing is also chronological.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── 2026-10-15T020000Z.json
//! └── 2026-10-16T020000Z.json
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::ChangeLogEntry;
use crate::storage::AuditSink;

/// Filesystem-safe audit file name for a timestamp.
pub fn audit_file_name(timestamp: &DateTime<Utc>) -> String {
    format!("{}.json", timestamp.format("%Y-%m-%dT%H%M%SZ"))
}

/// Directory of per-run audit files.
#[derive(Debug, Clone)]
pub struct LocalAuditLog {
    root_dir: PathBuf,
}

impl LocalAuditLog {
    /// Create an audit log rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Directory holding the audit files.
    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.root_dir).await?;

        let path = self.path(key);
        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(path)
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<PathBuf> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read JSON data, returning None if the file doesn't exist.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match tokio::fs::read(self.path(key)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Load the entry written for a given timestamp, if any.
    pub async fn load_entry(&self, timestamp: &DateTime<Utc>) -> Result<Option<ChangeLogEntry>> {
        self.read_json(&audit_file_name(timestamp)).await
    }

    /// List audit file names in chronological order.
    pub async fn list_files(&self) -> Result<Vec<String>> {
        let mut dir = match tokio::fs::read_dir(&self.root_dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::Io(e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".json") {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

#[async_trait]
impl AuditSink for LocalAuditLog {
    async fn write_entry(&self, entry: &ChangeLogEntry) -> Result<PathBuf> {
        let key = audit_file_name(&entry.timestamp);
        let path = self.write_json(&key, entry).await?;
        log::info!("Audit log written to {}", path.display());
        Ok(path)
    }
}
