// src/models/mod.rs

//! Domain models for the sync job.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod changelog;
mod config;
mod faculty;

// Re-export all public types
pub use changelog::{
    ChangeLogEntry, ChangeLogPage, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, PageRequest, Pagination,
};
pub use config::{Config, LoggingConfig, PathsConfig, SafetyConfig, SourceConfig};
pub use faculty::{FacultyRecord, FacultySummary};
