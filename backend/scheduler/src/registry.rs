//! Thread-safe map of scheduled jobs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use cron::Schedule;

use cronpilot_core::{CronpilotError, Job};

use crate::cron_parser::{next_after, parse_schedule};

/// Handle identifying one scheduling of a job. Rescheduling issues a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

struct ScheduleEntry {
    id: EntryId,
    job: Job,
    schedule: Schedule,
    next_fire: Option<DateTime<Utc>>,
}

/// Job id to schedule entry map.
///
/// Every method takes the lock for the duration of a map operation only;
/// callers never hold it across an `.await` or while a job runs.
#[derive(Default)]
pub struct JobRegistry {
    entries: Mutex<HashMap<i64, ScheduleEntry>>,
    next_id: AtomicU64,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<i64, ScheduleEntry>> {
        // Entries stay consistent even if a holder panicked.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Schedule `job`, replacing any entry it already has.
    ///
    /// A replacement with an unchanged expression keeps its pending fire
    /// time so an edit never drops an imminent firing.
    pub fn schedule(&self, job: &Job) -> Result<EntryId, CronpilotError> {
        let schedule = parse_schedule(&job.schedule)?;
        let id = EntryId(self.next_id.fetch_add(1, Ordering::Relaxed));

        let mut entries = self.entries();
        let next_fire = match entries.get(&job.id) {
            Some(existing) if existing.job.schedule == job.schedule => existing.next_fire,
            _ => next_after(&schedule, Utc::now()),
        };
        entries.insert(
            job.id,
            ScheduleEntry {
                id,
                job: job.clone(),
                schedule,
                next_fire,
            },
        );
        Ok(id)
    }

    /// Returns whether an entry existed.
    pub fn unschedule(&self, job_id: i64) -> bool {
        self.entries().remove(&job_id).is_some()
    }

    pub fn is_scheduled(&self, job_id: i64) -> bool {
        self.entries().contains_key(&job_id)
    }

    pub fn entry_id(&self, job_id: i64) -> Option<EntryId> {
        self.entries().get(&job_id).map(|e| e.id)
    }

    /// The job as it was when scheduled.
    pub fn snapshot(&self, job_id: i64) -> Option<Job> {
        self.entries().get(&job_id).map(|e| e.job.clone())
    }

    pub fn next_fire(&self, job_id: i64) -> Option<DateTime<Utc>> {
        self.entries().get(&job_id).and_then(|e| e.next_fire)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Scheduled job ids in ascending order.
    pub fn scheduled_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.entries().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    /// Snapshots of every job due at `now`, each advanced to its next
    /// occurrence after `now`. Occurrences missed in between collapse into
    /// this single firing.
    pub fn take_due(&self, now: DateTime<Utc>) -> Vec<Job> {
        let mut entries = self.entries();
        let mut due = Vec::new();
        for entry in entries.values_mut() {
            match entry.next_fire {
                Some(at) if at <= now => {
                    due.push(entry.job.clone());
                    entry.next_fire = next_after(&entry.schedule, now);
                }
                _ => {}
            }
        }
        due.sort_by_key(|job| job.id);
        due
    }
}
