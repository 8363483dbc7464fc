//! Change log writer.
//!
//! Every accepted run is recorded twice: in the durable change log store and
//! as a JSON audit file. The two writes are independent; each outcome is
//! reported separately so the caller decides which failures are fatal.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::ChangeLogEntry;
use crate::storage::{AuditSink, ChangeLogStore};

/// Destination name used in errors for the durable store.
pub const STORE_DESTINATION: &str = "change log store";

/// Destination name used in errors for the audit trail.
pub const AUDIT_DESTINATION: &str = "audit file";

/// Per-destination result of recording one entry.
#[derive(Debug)]
pub struct RecordOutcome {
    pub store: Result<()>,
    pub audit: Result<PathBuf>,
}

impl RecordOutcome {
    /// Both destinations written.
    pub fn is_complete(&self) -> bool {
        self.store.is_ok() && self.audit.is_ok()
    }

    /// Collapse into a single result, failing if either write failed.
    pub fn into_result(self) -> Result<PathBuf> {
        self.store?;
        self.audit
    }
}

/// Writes change log entries to the durable store and the audit trail.
#[derive(Clone)]
pub struct ChangeLogWriter {
    store: Arc<dyn ChangeLogStore>,
    audit: Arc<dyn AuditSink>,
}

impl ChangeLogWriter {
    pub fn new(store: Arc<dyn ChangeLogStore>, audit: Arc<dyn AuditSink>) -> Self {
        Self { store, audit }
    }

    /// Attempt both writes; neither is skipped or rolled back when the other fails.
    pub async fn record(&self, entry: &ChangeLogEntry) -> RecordOutcome {
        let store = self
            .store
            .insert(entry)
            .await
            .map_err(|e| AppError::persistence(STORE_DESTINATION, e));

        let audit = self
            .audit
            .write_entry(entry)
            .await
            .map_err(|e| AppError::persistence(AUDIT_DESTINATION, e));

        RecordOutcome { store, audit }
    }
}
