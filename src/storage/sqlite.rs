//! SQLite storage for the roster and change log history.
//!
//! SQLite is the source of truth: the `faculty` table holds the roster from
//! the most recent successful run and `change_logs` holds one row per run.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
    SqliteSynchronous,
};
use sqlx::Row;

use crate::error::{AppError, Result};
use crate::models::{ChangeLogEntry, ChangeLogPage, FacultyRecord, PageRequest, Pagination};
use crate::storage::{ChangeLogStore, FacultyStore};

const CHANGE_LOG_COLUMNS: &str = "timestamp, deleted_count, added_count, updated_count, \
     total_before, total_after, deleted_faculties, added_faculties";

/// SQLite-backed faculty and change log store.
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Open (or create) the database file and run migrations.
    pub async fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let storage = Self { pool };
        storage.run_migrations().await?;
        log::debug!("Opened database at {}", db_path.display());
        Ok(storage)
    }

    /// Create tables and indexes if they don't exist.
    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS faculty (
                employee_id INTEGER PRIMARY KEY,
                position INTEGER NOT NULL,
                name TEXT NOT NULL,
                designation TEXT NOT NULL,
                department TEXT NOT NULL,
                image_url TEXT,
                specializations TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS change_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                deleted_count INTEGER NOT NULL DEFAULT 0,
                added_count INTEGER NOT NULL DEFAULT 0,
                updated_count INTEGER NOT NULL DEFAULT 0,
                total_before INTEGER NOT NULL,
                total_after INTEGER NOT NULL,
                deleted_faculties TEXT NOT NULL,
                added_faculties TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_change_logs_timestamp ON change_logs(timestamp DESC)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Number of faculty records currently stored.
    pub async fn faculty_count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM faculty")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    /// Most recent change log entry, if any run has completed.
    pub async fn latest_change_log(&self) -> Result<Option<ChangeLogEntry>> {
        let sql = format!(
            "SELECT {CHANGE_LOG_COLUMNS} FROM change_logs ORDER BY timestamp DESC, id DESC LIMIT 1"
        );
        let row = sqlx::query(&sql).fetch_optional(&self.pool).await?;
        row.as_ref().map(change_log_from_row).transpose()
    }

    /// Close the connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl FacultyStore for SqliteStorage {
    async fn read_all(&self) -> Result<Vec<FacultyRecord>> {
        let rows = sqlx::query(
            "SELECT employee_id, name, designation, department, image_url, specializations \
             FROM faculty ORDER BY position",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(faculty_from_row).collect()
    }

    async fn replace_all(&self, roster: &[FacultyRecord]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let cleared = sqlx::query("DELETE FROM faculty").execute(&mut *tx).await?;

        for (position, record) in roster.iter().enumerate() {
            let specializations = serde_json::to_string(&record.specializations)?;
            sqlx::query(
                "INSERT INTO faculty (employee_id, position, name, designation, department, image_url, specializations) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(record.employee_id)
            .bind(position as i64)
            .bind(&record.name)
            .bind(&record.designation)
            .bind(&record.department)
            .bind(record.image_url.as_deref())
            .bind(specializations)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        log::info!(
            "Replaced faculty roster: {} removed, {} inserted",
            cleared.rows_affected(),
            roster.len()
        );
        Ok(())
    }
}

#[async_trait]
impl ChangeLogStore for SqliteStorage {
    async fn insert(&self, entry: &ChangeLogEntry) -> Result<()> {
        let sql = format!(
            "INSERT INTO change_logs ({CHANGE_LOG_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        );
        sqlx::query(&sql)
            .bind(encode_timestamp(&entry.timestamp))
            .bind(entry.deleted_count as i64)
            .bind(entry.added_count as i64)
            .bind(entry.updated_count as i64)
            .bind(entry.total_before as i64)
            .bind(entry.total_after as i64)
            .bind(serde_json::to_string(&entry.deleted_faculties)?)
            .bind(serde_json::to_string(&entry.added_faculties)?)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, request: PageRequest) -> Result<ChangeLogPage> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM change_logs")
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT {CHANGE_LOG_COLUMNS} FROM change_logs \
             ORDER BY timestamp DESC, id DESC LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query(&sql)
            .bind(request.limit as i64)
            .bind(request.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        let data = rows
            .iter()
            .map(change_log_from_row)
            .collect::<Result<Vec<_>>>()?;

        Ok(ChangeLogPage {
            data,
            pagination: Pagination::new(request, total as u64),
        })
    }
}

/// Fixed-width RFC 3339 so that text order matches time order.
fn encode_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn decode_timestamp(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::validation(format!("Stored timestamp '{text}' is invalid: {e}")))
}

fn faculty_from_row(row: &SqliteRow) -> Result<FacultyRecord> {
    let specializations: String = row.try_get("specializations")?;
    Ok(FacultyRecord {
        employee_id: row.try_get("employee_id")?,
        name: row.try_get("name")?,
        designation: row.try_get("designation")?,
        department: row.try_get("department")?,
        image_url: row.try_get("image_url")?,
        specializations: serde_json::from_str(&specializations)?,
    })
}

fn change_log_from_row(row: &SqliteRow) -> Result<ChangeLogEntry> {
    let timestamp: String = row.try_get("timestamp")?;
    let deleted: String = row.try_get("deleted_faculties")?;
    let added: String = row.try_get("added_faculties")?;

    Ok(ChangeLogEntry {
        timestamp: decode_timestamp(&timestamp)?,
        deleted_count: row.try_get::<i64, _>("deleted_count")? as usize,
        added_count: row.try_get::<i64, _>("added_count")? as usize,
        updated_count: row.try_get::<i64, _>("updated_count")? as usize,
        deleted_faculties: serde_json::from_str(&deleted)?,
        added_faculties: serde_json::from_str(&added)?,
        total_before: row.try_get::<i64, _>("total_before")? as usize,
        total_after: row.try_get::<i64, _>("total_after")? as usize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    use crate::models::FacultySummary;

    async fn open_temp() -> (TempDir, SqliteStorage) {
        let tmp = TempDir::new().unwrap();
        let storage = SqliteStorage::open(&tmp.path().join("db/faculty.sqlite"))
            .await
            .unwrap();
        (tmp, storage)
    }

    fn record(id: i64, name: &str) -> FacultyRecord {
        FacultyRecord {
            designation: "Professor".into(),
            department: "SENSE".into(),
            image_url: (id % 2 == 0).then(|| format!("https://cdn.example.com/{id}.jpg")),
            specializations: vec!["VLSI".into(), "Embedded Systems".into()],
            ..FacultyRecord::new(id, name)
        }
    }

    fn entry_at(timestamp: DateTime<Utc>, added: usize) -> ChangeLogEntry {
        let added_faculties: Vec<FacultySummary> = (0..added)
            .map(|i| FacultySummary::from(&record(i as i64 + 100, "New")))
            .collect();
        ChangeLogEntry {
            timestamp,
            deleted_count: 1,
            added_count: added,
            updated_count: 2,
            deleted_faculties: vec![record(1, "Gone")],
            added_faculties,
            total_before: 10,
            total_after: 9 + added,
        }
    }

    #[tokio::test]
    async fn test_empty_store_reads_nothing() {
        let (_tmp, storage) = open_temp().await;
        assert!(storage.read_all().await.unwrap().is_empty());
        assert_eq!(storage.faculty_count().await.unwrap(), 0);
        assert!(storage.latest_change_log().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace_all_round_trip_keeps_order() {
        let (_tmp, storage) = open_temp().await;
        let roster = vec![record(30, "C"), record(10, "A"), record(20, "B")];

        storage.replace_all(&roster).await.unwrap();
        assert_eq!(storage.read_all().await.unwrap(), roster);
    }

    #[tokio::test]
    async fn test_replace_all_discards_previous_roster() {
        let (_tmp, storage) = open_temp().await;
        storage
            .replace_all(&[record(1, "A"), record(2, "B")])
            .await
            .unwrap();
        storage.replace_all(&[record(3, "C")]).await.unwrap();

        let stored = storage.read_all().await.unwrap();
        assert_eq!(stored, vec![record(3, "C")]);
        assert_eq!(storage.faculty_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_replace_leaves_roster_intact() {
        let (_tmp, storage) = open_temp().await;
        let original = vec![record(1, "A"), record(2, "B")];
        storage.replace_all(&original).await.unwrap();

        // Duplicate primary key fails the transaction midway.
        let result = storage
            .replace_all(&[record(5, "E"), record(5, "E again")])
            .await;
        assert!(matches!(result, Err(AppError::Database(_))));
        assert_eq!(storage.read_all().await.unwrap(), original);
    }

    #[tokio::test]
    async fn test_change_log_round_trip() {
        let (_tmp, storage) = open_temp().await;
        let entry = entry_at(Utc::now(), 2);

        storage.insert(&entry).await.unwrap();
        let latest = storage.latest_change_log().await.unwrap().unwrap();
        assert_eq!(latest, entry);
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_paginated() {
        let (_tmp, storage) = open_temp().await;
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        for day in 0..5 {
            storage
                .insert(&entry_at(base + Duration::days(day), day as usize))
                .await
                .unwrap();
        }

        let first = storage.list(PageRequest::new(Some(1), Some(2))).await.unwrap();
        assert_eq!(first.pagination.total, 5);
        assert_eq!(first.pagination.total_pages, 3);
        assert_eq!(first.data.len(), 2);
        assert_eq!(first.data[0].timestamp, base + Duration::days(4));
        assert_eq!(first.data[1].timestamp, base + Duration::days(3));

        let last = storage.list(PageRequest::new(Some(3), Some(2))).await.unwrap();
        assert_eq!(last.data.len(), 1);
        assert_eq!(last.data[0].timestamp, base);

        let beyond = storage.list(PageRequest::new(Some(9), Some(2))).await.unwrap();
        assert!(beyond.data.is_empty());
        assert_eq!(beyond.pagination.page, 9);
    }

    #[tokio::test]
    async fn test_reopen_keeps_data() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("faculty.sqlite");

        let storage = SqliteStorage::open(&path).await.unwrap();
        storage.replace_all(&[record(1, "A")]).await.unwrap();
        storage.close().await;

        let reopened = SqliteStorage::open(&path).await.unwrap();
        assert_eq!(reopened.read_all().await.unwrap(), vec![record(1, "A")]);
    }

    #[test]
    fn test_encoded_timestamps_sort_like_time() {
        let a = Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap();
        let b = a + Duration::milliseconds(1);
        assert!(encode_timestamp(&a) < encode_timestamp(&b));
        assert_eq!(decode_timestamp(&encode_timestamp(&b)).unwrap(), b);
    }
}
