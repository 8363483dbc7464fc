//! Diff calculation between two rosters.
//!
//! Computes the difference between the stored roster and a freshly fetched
//! one, keyed by employee id, to build the run's change log.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{ChangeLogEntry, FacultyRecord, FacultySummary};

/// Classified difference between two rosters.
///
/// Each list keeps the relative order of the roster it was filtered from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterDiff {
    /// In current but not in previous
    pub added: Vec<FacultyRecord>,
    /// In previous but not in current
    pub deleted: Vec<FacultyRecord>,
    /// In both with at least one differing field (current values)
    pub updated: Vec<FacultyRecord>,
    pub total_before: usize,
    pub total_after: usize,
}

impl RosterDiff {
    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.updated.is_empty() || !self.deleted.is_empty()
    }

    /// Get the total number of changes.
    pub fn change_count(&self) -> usize {
        self.added.len() + self.updated.len() + self.deleted.len()
    }

    /// Turn the diff into a change log entry stamped with `timestamp`.
    pub fn into_entry(self, timestamp: DateTime<Utc>) -> ChangeLogEntry {
        ChangeLogEntry {
            timestamp,
            deleted_count: self.deleted.len(),
            added_count: self.added.len(),
            updated_count: self.updated.len(),
            added_faculties: self.added.iter().map(FacultySummary::from).collect(),
            deleted_faculties: self.deleted,
            total_before: self.total_before,
            total_after: self.total_after,
        }
    }
}

/// Calculate the diff between previous and current rosters.
pub fn calculate_diff(previous: &[FacultyRecord], current: &[FacultyRecord]) -> RosterDiff {
    let prev_map: HashMap<i64, &FacultyRecord> =
        previous.iter().map(|r| (r.employee_id, r)).collect();

    let curr_map: HashMap<i64, &FacultyRecord> =
        current.iter().map(|r| (r.employee_id, r)).collect();

    let deleted = previous
        .iter()
        .filter(|r| !curr_map.contains_key(&r.employee_id))
        .cloned()
        .collect();

    let mut added = Vec::new();
    let mut updated = Vec::new();
    for record in current {
        match prev_map.get(&record.employee_id) {
            None => added.push(record.clone()),
            Some(prev) if *prev != record => updated.push(record.clone()),
            Some(_) => {}
        }
    }

    RosterDiff {
        added,
        deleted,
        updated,
        total_before: previous.len(),
        total_after: current.len(),
    }
}

/// Compute the change log entry for replacing `previous` with `current`.
pub fn diff(
    previous: &[FacultyRecord],
    current: &[FacultyRecord],
    timestamp: DateTime<Utc>,
) -> ChangeLogEntry {
    calculate_diff(previous, current).into_entry(timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_faculty(id: i64, name: &str) -> FacultyRecord {
        FacultyRecord {
            designation: "Assistant Professor".into(),
            department: "SCOPE".into(),
            specializations: vec!["Data Mining".into(), "Cloud".into()],
            ..FacultyRecord::new(id, name)
        }
    }

    fn ids(records: &[FacultyRecord]) -> Vec<i64> {
        records.iter().map(|r| r.employee_id).collect()
    }

    #[test]
    fn test_no_changes() {
        let roster = vec![make_faculty(1, "A"), make_faculty(2, "B")];

        let result = calculate_diff(&roster, &roster.clone());
        assert!(!result.has_changes());
        assert_eq!(result.change_count(), 0);

        let entry = result.into_entry(Utc::now());
        assert_eq!(entry.added_count, 0);
        assert_eq!(entry.deleted_count, 0);
        assert_eq!(entry.updated_count, 0);
        assert_eq!(entry.total_before, entry.total_after);
    }

    #[test]
    fn test_membership_swap() {
        let prev = vec![make_faculty(1, "A"), make_faculty(2, "B")];
        let curr = vec![make_faculty(1, "A"), make_faculty(3, "C")];

        let entry = diff(&prev, &curr, Utc::now());
        assert_eq!(entry.deleted_faculties, vec![make_faculty(2, "B")]);
        assert_eq!(entry.added_faculties.len(), 1);
        assert_eq!(entry.added_faculties[0].employee_id, 3);
        assert_eq!(entry.added_faculties[0].name, "C");
        assert_eq!(entry.updated_count, 0);
        assert_eq!(entry.total_before, 2);
        assert_eq!(entry.total_after, 2);
    }

    #[test]
    fn test_name_change_is_update() {
        let prev = vec![make_faculty(1, "A")];
        let curr = vec![make_faculty(1, "A2")];

        let result = calculate_diff(&prev, &curr);
        assert_eq!(result.updated, vec![make_faculty(1, "A2")]);
        assert!(result.added.is_empty());
        assert!(result.deleted.is_empty());

        let entry = result.into_entry(Utc::now());
        assert_eq!(entry.updated_count, 1);
        assert!(entry.added_faculties.is_empty());
        assert!(entry.deleted_faculties.is_empty());
    }

    #[test]
    fn test_every_field_participates_in_equality() {
        let base = make_faculty(1, "A");
        let variants = [
            FacultyRecord {
                designation: "Professor".into(),
                ..base.clone()
            },
            FacultyRecord {
                department: "SENSE".into(),
                ..base.clone()
            },
            FacultyRecord {
                image_url: Some("https://cdn.example.com/1.jpg".into()),
                ..base.clone()
            },
            FacultyRecord {
                specializations: vec!["Cloud".into(), "Data Mining".into()],
                ..base.clone()
            },
            FacultyRecord {
                specializations: vec!["Data Mining".into()],
                ..base.clone()
            },
        ];

        for changed in variants {
            let result = calculate_diff(std::slice::from_ref(&base), &[changed]);
            assert_eq!(result.updated.len(), 1);
        }
    }

    #[test]
    fn test_order_is_preserved() {
        let prev = vec![
            make_faculty(9, "I"),
            make_faculty(4, "D"),
            make_faculty(7, "G"),
            make_faculty(1, "A"),
        ];
        let curr = vec![
            make_faculty(8, "H"),
            make_faculty(1, "A*"),
            make_faculty(2, "B"),
            make_faculty(9, "I*"),
        ];

        let result = calculate_diff(&prev, &curr);
        assert_eq!(ids(&result.deleted), vec![4, 7]);
        assert_eq!(ids(&result.added), vec![8, 2]);
        assert_eq!(ids(&result.updated), vec![1, 9]);
    }

    #[test]
    fn test_each_missing_id_reported_once() {
        let prev: Vec<_> = (1..=50).map(|i| make_faculty(i, "P")).collect();
        let curr: Vec<_> = (26..=80).map(|i| make_faculty(i, "P")).collect();

        let result = calculate_diff(&prev, &curr);
        assert_eq!(ids(&result.deleted), (1..=25).collect::<Vec<_>>());
        assert_eq!(ids(&result.added), (51..=80).collect::<Vec<_>>());
        assert!(result.updated.is_empty());
    }

    #[test]
    fn test_totals_balance() {
        let prev: Vec<_> = (1..=10).map(|i| make_faculty(i, "X")).collect();
        let mut curr: Vec<_> = (4..=15).map(|i| make_faculty(i, "X")).collect();
        curr[0].name = "Renamed".into();

        let entry = diff(&prev, &curr, Utc::now());
        assert_eq!(
            entry.total_after,
            entry.total_before + entry.added_count - entry.deleted_count
        );
        assert_eq!(entry.added_count, entry.added_faculties.len());
        assert_eq!(entry.deleted_count, entry.deleted_faculties.len());
        assert_eq!(entry.updated_count, 1);
    }

    #[test]
    fn test_empty_to_full() {
        let curr = vec![make_faculty(1, "First")];

        let result = calculate_diff(&[], &curr);
        assert_eq!(result.added.len(), 1);
        assert!(result.deleted.is_empty());
    }

    #[test]
    fn test_full_to_empty() {
        let prev = vec![make_faculty(1, "Last")];

        let result = calculate_diff(&prev, &[]);
        assert!(result.added.is_empty());
        assert_eq!(result.deleted.len(), 1);
    }
}
