//! Pipeline stages for roster synchronization.
//!
//! - `validate`: safety gate in front of destructive writes
//! - `diff`: roster comparison producing change logs
//! - `record`: dual write of change logs
//! - `ingest`: the orchestrator running one sync
//! - `history`: paginated change log queries

pub mod diff;
pub mod history;
pub mod ingest;
pub mod record;
pub mod validate;

pub use diff::{RosterDiff, calculate_diff, diff};
pub use history::{load_history, render_page};
pub use ingest::{IngestOptions, IngestReport, IngestStage, Ingestor};
pub use record::{ChangeLogWriter, RecordOutcome};
pub use validate::{GateResult, ValidationGate, change_percent};
