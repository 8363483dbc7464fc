//! Upstream roster sources.
//!
//! A source produces the current faculty roster. The CMS adapter fetches it
//! over HTTP; tests plug in fixed rosters through the same trait.

pub mod cms;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::FacultyRecord;

pub use cms::{CmsSource, parse_roster};

/// Outcome of parsing one upstream item.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRecord {
    /// Item mapped to a faculty record
    Valid(FacultyRecord),
    /// Item discarded, with the reason
    Skipped(String),
}

/// Trait for roster providers.
#[async_trait]
pub trait RosterSource: Send + Sync {
    /// Fetch the full current roster.
    async fn fetch_roster(&self) -> Result<Vec<FacultyRecord>>;

    /// Human-readable description for logs.
    fn describe(&self) -> String;
}
