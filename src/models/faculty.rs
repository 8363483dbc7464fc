//! Faculty record data structures.

use serde::{Deserialize, Serialize};

/// A faculty member as stored in the roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FacultyRecord {
    /// Stable external identifier (unique key)
    pub employee_id: i64,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Job title (e.g., "Assistant Professor")
    #[serde(default)]
    pub designation: String,

    /// Department or school name
    #[serde(default)]
    pub department: String,

    /// Profile photo URL
    #[serde(default)]
    pub image_url: Option<String>,

    /// Research areas, in upstream order
    #[serde(default)]
    pub specializations: Vec<String>,
}

impl FacultyRecord {
    /// Create a record with only an id and name set.
    pub fn new(employee_id: i64, name: impl Into<String>) -> Self {
        Self {
            employee_id,
            name: name.into(),
            designation: String::new(),
            department: String::new(),
            image_url: None,
            specializations: Vec::new(),
        }
    }

    /// Split comma-separated specialization text into trimmed, non-empty entries.
    pub fn parse_specializations(text: &str) -> Vec<String> {
        text.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

/// Partial faculty snapshot kept for additions in a change log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FacultySummary {
    pub employee_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub department: String,
}

impl From<&FacultyRecord> for FacultySummary {
    fn from(record: &FacultyRecord) -> Self {
        Self {
            employee_id: record.employee_id,
            name: record.name.clone(),
            designation: record.designation.clone(),
            department: record.department.clone(),
        }
    }
}
