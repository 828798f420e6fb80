/// Durable execution log.
///
/// Every run appends one row. Rows outlive the job they belong to.
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, Row};

use cronpilot_core::{CronpilotError, ExecutionLogStore, ExecutionRecord};

pub struct SqliteRunLog {
    conn: Mutex<Connection>,
}

impl SqliteRunLog {
    pub fn open(db_path: &str) -> Result<Self, CronpilotError> {
        let conn = Connection::open(db_path).map_err(CronpilotError::storage)?;
        Self::init(conn)
    }

    pub fn in_memory() -> Result<Self, CronpilotError> {
        let conn = Connection::open_in_memory().map_err(CronpilotError::storage)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, CronpilotError> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            CREATE TABLE IF NOT EXISTS execution_logs (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                job_id     INTEGER NOT NULL,
                job_name   TEXT NOT NULL,
                start_time INTEGER NOT NULL,
                end_time   INTEGER NOT NULL,
                success    INTEGER NOT NULL,
                output     TEXT NOT NULL DEFAULT '',
                error      TEXT
            );
            CREATE INDEX IF NOT EXISTS execution_logs_job_id ON execution_logs(job_id);
            "#,
        )
        .map_err(CronpilotError::storage)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Most recent records for a job, newest first.
    pub fn recent(&self, job_id: i64, limit: usize) -> Result<Vec<ExecutionRecord>, CronpilotError> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, job_id, job_name, start_time, end_time, success, output, error
                 FROM execution_logs WHERE job_id = ?1
                 ORDER BY id DESC LIMIT ?2",
            )
            .map_err(CronpilotError::storage)?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let records = stmt
            .query_map(params![job_id, limit], record_from_row)
            .map_err(CronpilotError::storage)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(CronpilotError::storage)?;
        Ok(records)
    }
}

impl ExecutionLogStore for SqliteRunLog {
    fn append(&self, record: &ExecutionRecord) -> Result<i64, CronpilotError> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO execution_logs (job_id, job_name, start_time, end_time, success, output, error)
             VALUES (?1,?2,?3,?4,?5,?6,?7)",
            params![
                record.job_id,
                record.job_name,
                record.started_at.timestamp_millis(),
                record.finished_at.timestamp_millis(),
                record.success,
                record.output,
                record.error,
            ],
        )
        .map_err(CronpilotError::storage)?;
        Ok(conn.last_insert_rowid())
    }
}

fn millis(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let ms: i64 = row.get(idx)?;
    Utc.timestamp_millis_opt(ms).single().ok_or_else(|| {
        rusqlite::Error::IntegralValueOutOfRange(idx, ms)
    })
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<ExecutionRecord> {
    Ok(ExecutionRecord {
        id: Some(row.get(0)?),
        job_id: row.get(1)?,
        job_name: row.get(2)?,
        started_at: millis(row, 3)?,
        finished_at: millis(row, 4)?,
        success: row.get(5)?,
        output: row.get(6)?,
        error: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(job_id: i64, success: bool) -> ExecutionRecord {
        let started_at = Utc.with_ymd_and_hms(2024, 5, 1, 2, 0, 0).unwrap();
        ExecutionRecord {
            id: None,
            job_id,
            job_name: format!("job-{job_id}"),
            started_at,
            finished_at: started_at + Duration::milliseconds(1_250),
            success,
            output: "out".into(),
            error: (!success).then(|| "exit status 1".to_string()),
        }
    }

    #[test]
    fn append_then_recent_newest_first() {
        let log = SqliteRunLog::in_memory().unwrap();
        let first = log.append(&record(1, true)).unwrap();
        let second = log.append(&record(1, false)).unwrap();
        log.append(&record(2, true)).unwrap();

        let rows = log.recent(1, 10).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, Some(second));
        assert_eq!(rows[1].id, Some(first));
        assert_eq!(rows[0].error.as_deref(), Some("exit status 1"));
        assert_eq!(rows[1].duration(), Duration::milliseconds(1_250));
        assert_eq!(rows[1].started_at, record(1, true).started_at);
    }

    #[test]
    fn recent_respects_limit() {
        let log = SqliteRunLog::in_memory().unwrap();
        for _ in 0..5 {
            log.append(&record(7, true)).unwrap();
        }
        assert_eq!(log.recent(7, 3).unwrap().len(), 3);
        assert!(log.recent(8, 3).unwrap().is_empty());
    }
}
