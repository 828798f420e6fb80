/// Durable SQLite-backed storage for job definitions.
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{params, Connection, OptionalExtension, Row};

use cronpilot_core::{CronpilotError, Job, JobStore, NewJob};

const JOB_COLUMNS: &str = "id, name, schedule, command, method, headers, enabled, description,
     notify_on_success, notify_on_failure, notification_channels, notification_config";

pub struct SqliteJobStore {
    conn: Mutex<Connection>,
}

impl SqliteJobStore {
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
            CREATE TABLE IF NOT EXISTS jobs (
                id                    INTEGER PRIMARY KEY AUTOINCREMENT,
                name                  TEXT NOT NULL,
                schedule              TEXT NOT NULL,
                command               TEXT NOT NULL,
                method                TEXT NOT NULL DEFAULT 'GET',
                headers               TEXT NOT NULL DEFAULT '',
                enabled               INTEGER NOT NULL DEFAULT 1,
                description           TEXT NOT NULL DEFAULT '',
                notify_on_success     INTEGER NOT NULL DEFAULT 0,
                notify_on_failure     INTEGER NOT NULL DEFAULT 1,
                notification_channels TEXT NOT NULL DEFAULT '',
                notification_config   TEXT NOT NULL DEFAULT ''
            );
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

    pub fn create(&self, job: &NewJob) -> Result<Job, CronpilotError> {
        let conn = self.conn();
        conn.execute(
            r#"INSERT INTO jobs
               (name, schedule, command, method, headers, enabled, description,
                notify_on_success, notify_on_failure, notification_channels, notification_config)
               VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)"#,
            params![
                job.name, job.schedule, job.command, job.method, job.headers,
                job.enabled, job.description, job.notify_on_success, job.notify_on_failure,
                job.notification_channels, job.notification_config,
            ],
        )
        .map_err(CronpilotError::storage)?;
        Ok(job.clone().into_job(conn.last_insert_rowid()))
    }

    /// Overwrite every column of an existing job.
    pub fn update(&self, job: &Job) -> Result<(), CronpilotError> {
        let changed = self
            .conn()
            .execute(
                r#"UPDATE jobs SET
                     name=?2, schedule=?3, command=?4, method=?5, headers=?6, enabled=?7,
                     description=?8, notify_on_success=?9, notify_on_failure=?10,
                     notification_channels=?11, notification_config=?12
                   WHERE id=?1"#,
                params![
                    job.id, job.name, job.schedule, job.command, job.method, job.headers,
                    job.enabled, job.description, job.notify_on_success, job.notify_on_failure,
                    job.notification_channels, job.notification_config,
                ],
            )
            .map_err(CronpilotError::storage)?;
        if changed == 0 {
            return Err(CronpilotError::JobNotFound(job.id));
        }
        Ok(())
    }

    pub fn set_enabled(&self, id: i64, enabled: bool) -> Result<Job, CronpilotError> {
        let changed = self
            .conn()
            .execute(
                "UPDATE jobs SET enabled = ?2 WHERE id = ?1",
                params![id, enabled],
            )
            .map_err(CronpilotError::storage)?;
        if changed == 0 {
            return Err(CronpilotError::JobNotFound(id));
        }
        self.find_by_id(id)
    }

    /// Execution logs of the job are kept.
    pub fn delete(&self, id: i64) -> Result<(), CronpilotError> {
        let changed = self
            .conn()
            .execute("DELETE FROM jobs WHERE id = ?1", params![id])
            .map_err(CronpilotError::storage)?;
        if changed == 0 {
            return Err(CronpilotError::JobNotFound(id));
        }
        Ok(())
    }

    pub fn list_all(&self) -> Result<Vec<Job>, CronpilotError> {
        self.query(&format!("SELECT {JOB_COLUMNS} FROM jobs ORDER BY id"))
    }

    fn query(&self, sql: &str) -> Result<Vec<Job>, CronpilotError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(sql).map_err(CronpilotError::storage)?;
        let jobs = stmt
            .query_map([], job_from_row)
            .map_err(CronpilotError::storage)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(CronpilotError::storage)?;
        Ok(jobs)
    }
}

impl JobStore for SqliteJobStore {
    fn list_enabled(&self) -> Result<Vec<Job>, CronpilotError> {
        self.query(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE enabled = 1 ORDER BY id"))
    }

    fn find_by_id(&self, id: i64) -> Result<Job, CronpilotError> {
        self.conn()
            .query_row(
                &format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?1"),
                params![id],
                job_from_row,
            )
            .optional()
            .map_err(CronpilotError::storage)?
            .ok_or(CronpilotError::JobNotFound(id))
    }
}

fn job_from_row(row: &Row<'_>) -> rusqlite::Result<Job> {
    Ok(Job {
        id: row.get(0)?,
        name: row.get(1)?,
        schedule: row.get(2)?,
        command: row.get(3)?,
        method: row.get(4)?,
        headers: row.get(5)?,
        enabled: row.get(6)?,
        description: row.get(7)?,
        notify_on_success: row.get(8)?,
        notify_on_failure: row.get(9)?,
        notification_channels: row.get(10)?,
        notification_config: row.get(11)?,
    })
}
