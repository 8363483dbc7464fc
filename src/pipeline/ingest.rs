// src/pipeline/ingest.rs

//! Ingestion orchestrator.
//!
//! Runs one synchronization as a strict sequence of stages:
//!
//! ```text
//! FETCHING → VALIDATING → DIFFING → LOGGING → COMMITTING → DONE
//!     └──────────┴────────────────────┴──────────┴──→ ABORTED
//! ```
//!
//! Nothing is retried. A failure before LOGGING leaves both the roster and
//! the change log history untouched.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;

use crate::error::{AppError, Result};
use crate::models::{ChangeLogEntry, SafetyConfig};
use crate::source::RosterSource;
use crate::storage::FacultyStore;

use super::diff::calculate_diff;
use super::record::{ChangeLogWriter, RecordOutcome};
use super::validate::ValidationGate;

/// Stage of an ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Fetching,
    Validating,
    Diffing,
    Logging,
    Committing,
    Done,
    /// Terminal state of a failed run. `AppError::Aborted` carries the stage
    /// that failed instead, so this value only appears in logs.
    Aborted,
}

impl IngestStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestStage::Fetching => "FETCHING",
            IngestStage::Validating => "VALIDATING",
            IngestStage::Diffing => "DIFFING",
            IngestStage::Logging => "LOGGING",
            IngestStage::Committing => "COMMITTING",
            IngestStage::Done => "DONE",
            IngestStage::Aborted => "ABORTED",
        }
    }
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run options.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    /// Stop after diffing; write nothing
    pub dry_run: bool,
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct IngestReport {
    /// Change log computed for the run
    pub entry: ChangeLogEntry,
    /// Employee ids whose records changed
    pub updated_ids: Vec<i64>,
    /// Audit file, when it was written
    pub audit_path: Option<PathBuf>,
    /// Whether the roster was replaced
    pub committed: bool,
}

/// Drives one fetch → validate → diff → log → commit run.
pub struct Ingestor {
    source: Arc<dyn RosterSource>,
    faculty: Arc<dyn FacultyStore>,
    writer: ChangeLogWriter,
    gate: ValidationGate,
    options: IngestOptions,
}

impl Ingestor {
    pub fn new(
        source: Arc<dyn RosterSource>,
        faculty: Arc<dyn FacultyStore>,
        writer: ChangeLogWriter,
        safety: SafetyConfig,
    ) -> Self {
        Self {
            source,
            faculty,
            writer,
            gate: ValidationGate::new(safety),
            options: IngestOptions::default(),
        }
    }

    pub fn with_options(mut self, options: IngestOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the pipeline to DONE, or report the stage it aborted in.
    pub async fn run(&self) -> Result<IngestReport> {
        let mut stage = IngestStage::Fetching;
        log::info!("Ingestion starting from {}", self.source.describe());

        match self.run_stages(&mut stage).await {
            Ok(report) => Ok(report),
            Err(e) => {
                log::error!("{} → {}: {}", stage, IngestStage::Aborted, e);
                Err(AppError::aborted(stage, e))
            }
        }
    }

    async fn run_stages(&self, stage: &mut IngestStage) -> Result<IngestReport> {
        let current = self.source.fetch_roster().await?;
        advance(stage, IngestStage::Validating);

        let previous = self.faculty.read_all().await?;
        self.gate.validate(current.len(), previous.len())?;
        advance(stage, IngestStage::Diffing);

        let diff = calculate_diff(&previous, &current);
        log::debug!("{} records differ from the stored roster", diff.change_count());
        let updated_ids: Vec<i64> = diff.updated.iter().map(|r| r.employee_id).collect();
        let entry = diff.into_entry(Utc::now());
        log::info!("Diff: {}", entry.summary());

        if self.options.dry_run {
            log::info!("Dry run: leaving roster and change log untouched");
            return Ok(IngestReport {
                entry,
                updated_ids,
                audit_path: None,
                committed: false,
            });
        }
        advance(stage, IngestStage::Logging);

        let RecordOutcome { store, audit } = self.writer.record(&entry).await;
        store?;
        let audit_path = match audit {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("Continuing without audit file: {}", e);
                None
            }
        };
        advance(stage, IngestStage::Committing);

        self.faculty.replace_all(&current).await?;
        advance(stage, IngestStage::Done);

        Ok(IngestReport {
            entry,
            updated_ids,
            audit_path,
            committed: true,
        })
    }
}

fn advance(stage: &mut IngestStage, next: IngestStage) {
    log::debug!("{} → {}", stage, next);
    *stage = next;
}
