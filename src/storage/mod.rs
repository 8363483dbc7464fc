//! Storage abstractions for roster and change log persistence.
//!
//! The job writes to two kinds of destination:
//! - Durable store: SQLite database holding the live roster and the
//!   queryable change log history
//! - Audit trail: one JSON file per successful run, named by timestamp
//!
//! ## Directory Structure
//!
//! ```text
//! data/
//! ├── faculty.sqlite              # faculty + change_logs tables
//! └── change_logs/                # Audit trail (one file per run)
//!     ├── 2026-10-15T020000Z.json
//!     └── 2026-10-16T020000Z.json
//! ```

pub mod local;
pub mod sqlite;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ChangeLogEntry, ChangeLogPage, FacultyRecord, PageRequest};

// Re-export for convenience
pub use local::{LocalAuditLog, audit_file_name};
pub use sqlite::SqliteStorage;

/// Keyed collection of faculty records.
#[async_trait]
pub trait FacultyStore: Send + Sync {
    /// Load the full roster in stored order.
    async fn read_all(&self) -> Result<Vec<FacultyRecord>>;

    /// Replace the full roster in one atomic step.
    async fn replace_all(&self, roster: &[FacultyRecord]) -> Result<()>;
}

/// Durable, queryable change log history.
#[async_trait]
pub trait ChangeLogStore: Send + Sync {
    /// Append a change log entry.
    async fn insert(&self, entry: &ChangeLogEntry) -> Result<()>;

    /// Load one page of entries, newest first.
    async fn list(&self, request: PageRequest) -> Result<ChangeLogPage>;
}

/// Secondary audit destination for change log entries.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Write one entry, returning where it landed.
    async fn write_entry(&self, entry: &ChangeLogEntry) -> Result<PathBuf>;
}
