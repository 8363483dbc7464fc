//! Change log data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FacultyRecord, FacultySummary};

/// Default page size for change log queries.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Largest page size a change log query may request.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Persisted summary of one successful ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLogEntry {
    /// When the diff was computed
    pub timestamp: DateTime<Utc>,

    pub deleted_count: usize,
    pub added_count: usize,
    pub updated_count: usize,

    /// Full snapshots of records that disappeared
    pub deleted_faculties: Vec<FacultyRecord>,

    /// Partial snapshots of records that appeared
    pub added_faculties: Vec<FacultySummary>,

    pub total_before: usize,
    pub total_after: usize,
}

impl ChangeLogEntry {
    /// Check if the run changed anything.
    pub fn has_changes(&self) -> bool {
        self.deleted_count > 0 || self.added_count > 0 || self.updated_count > 0
    }

    /// One-line summary for logs and CLI output.
    pub fn summary(&self) -> String {
        format!(
            "{} added, {} updated, {} removed ({} → {})",
            self.added_count,
            self.updated_count,
            self.deleted_count,
            self.total_before,
            self.total_after
        )
    }
}

/// Normalized page request for change log queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Build a page request from raw query values.
    ///
    /// Absent or zero values fall back to page 1 and a limit of 20; the limit
    /// is clamped to `1..=100`.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.filter(|p| *p != 0).unwrap_or(1).max(1);
        let limit = limit
            .filter(|l| *l != 0)
            .unwrap_or(DEFAULT_PAGE_LIMIT as i64)
            .clamp(1, MAX_PAGE_LIMIT as i64);

        Self {
            page: u32::try_from(page).unwrap_or(u32::MAX),
            limit: limit as u32,
        }
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Pagination metadata returned with a page of change logs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: u64) -> Self {
        Self {
            page: request.page,
            limit: request.limit,
            total,
            total_pages: total.div_ceil(request.limit as u64),
        }
    }
}

/// A page of change logs, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeLogPage {
    pub data: Vec<ChangeLogEntry>,
    pub pagination: Pagination,
}
