use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use cronpilot_core::{CronpilotError, Job, JobStore};
use cronpilot_executor::Executor;

use crate::registry::JobRegistry;

/// Default clock resolution.
pub const DEFAULT_TICK: Duration = Duration::from_millis(1000);

struct Running {
    shutdown: watch::Sender<bool>,
    clock: JoinHandle<()>,
}

/// Outcome of a [`Scheduler::reconcile`] pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
    pub invalid: usize,
}

impl ReconcileReport {
    /// True when the registry was left as it was. Invalid jobs are retried
    /// every pass and do not count as a change.
    pub fn is_noop(&self) -> bool {
        self.added == 0 && self.updated == 0 && self.removed == 0
    }
}

/// Drives enabled jobs from their cron expressions.
///
/// A single clock task checks the registry every tick and spawns one task
/// per due job. Firings never wait on each other, including overlapping
/// firings of the same job.
pub struct Scheduler {
    jobs: Arc<dyn JobStore>,
    executor: Arc<Executor>,
    registry: Arc<JobRegistry>,
    tick: Duration,
    running: Mutex<Option<Running>>,
}

impl Scheduler {
    pub fn new(jobs: Arc<dyn JobStore>, executor: Arc<Executor>) -> Self {
        Self::with_tick(jobs, executor, DEFAULT_TICK)
    }

    pub fn with_tick(jobs: Arc<dyn JobStore>, executor: Arc<Executor>, tick: Duration) -> Self {
        Self {
            jobs,
            executor,
            registry: Arc::new(JobRegistry::new()),
            tick,
            running: Mutex::new(None),
        }
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    fn running(&self) -> MutexGuard<'_, Option<Running>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_running(&self) -> bool {
        self.running().is_some()
    }

    /// Schedule every enabled job and start the clock.
    ///
    /// Jobs with an invalid expression are logged and skipped. Returns the
    /// number of jobs scheduled.
    pub async fn start(&self) -> Result<usize, CronpilotError> {
        let mut running = self.running();
        if running.is_some() {
            return Err(CronpilotError::AlreadyRunning);
        }

        let jobs = self.jobs.list_enabled()?;
        let total = jobs.len();
        let mut scheduled = 0;
        for job in &jobs {
            if self.schedule_logged(job) {
                scheduled += 1;
            }
        }

        let (shutdown, shutdown_rx) = watch::channel(false);
        let clock = tokio::spawn(run_clock(
            self.registry.clone(),
            self.executor.clone(),
            self.tick,
            shutdown_rx,
        ));
        *running = Some(Running { shutdown, clock });

        info!(scheduled, skipped = total - scheduled, tick_ms = self.tick.as_millis() as u64, "Scheduler started");
        Ok(scheduled)
    }

    /// Stop the clock and clear the registry. Firings already in flight run
    /// to completion.
    pub async fn stop(&self) {
        let Some(Running { shutdown, clock }) = self.running().take() else {
            return;
        };
        let _ = shutdown.send(true);
        if let Err(e) = clock.await {
            warn!(error = %e, "Scheduler clock task ended abnormally");
        }
        self.registry.clear();
        info!("Scheduler stopped");
    }

    /// Apply the enabled flag of an edited job to the registry.
    pub fn sync_job(&self, job: &Job) -> Result<(), CronpilotError> {
        if job.enabled {
            let entry = self.registry.schedule(job)?;
            debug!(job_id = job.id, entry = ?entry, "Job scheduled");
        } else if self.registry.unschedule(job.id) {
            debug!(job_id = job.id, "Job unscheduled");
        }
        Ok(())
    }

    /// Unschedule a deleted job.
    pub fn remove_job(&self, job_id: i64) {
        if self.registry.unschedule(job_id) {
            debug!(job_id, "Job removed from schedule");
        }
    }

    /// Converge the registry on the store's current enabled set.
    pub fn reconcile(&self) -> Result<ReconcileReport, CronpilotError> {
        let jobs = self.jobs.list_enabled()?;
        let mut report = ReconcileReport::default();
        let enabled: HashSet<i64> = jobs.iter().map(|j| j.id).collect();

        for job in &jobs {
            match self.registry.snapshot(job.id) {
                Some(current) if current == *job => {}
                Some(_) => {
                    if self.schedule_logged(job) {
                        report.updated += 1;
                    } else {
                        self.registry.unschedule(job.id);
                        report.invalid += 1;
                    }
                }
                None => {
                    if self.schedule_logged(job) {
                        report.added += 1;
                    } else {
                        report.invalid += 1;
                    }
                }
            }
        }

        for id in self.registry.scheduled_ids() {
            if !enabled.contains(&id) && self.registry.unschedule(id) {
                report.removed += 1;
            }
        }

        if !report.is_noop() {
            info!(
                added = report.added,
                updated = report.updated,
                removed = report.removed,
                invalid = report.invalid,
                "Schedule reconciled"
            );
        }
        Ok(report)
    }

    fn schedule_logged(&self, job: &Job) -> bool {
        match self.registry.schedule(job) {
            Ok(_) => {
                info!(
                    job_id = job.id,
                    job = %job.name,
                    next = ?self.registry.next_fire(job.id),
                    "Registered cron job"
                );
                true
            }
            Err(e) => {
                warn!(job_id = job.id, job = %job.name, error = %e, "Invalid cron expression, skipping");
                false
            }
        }
    }
}

async fn run_clock(
    registry: Arc<JobRegistry>,
    executor: Arc<Executor>,
    tick: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for job in registry.take_due(Utc::now()) {
                    debug!(job_id = job.id, job = %job.name, "Trigger fired");
                    let executor = executor.clone();
                    tokio::spawn(async move {
                        executor.run_scheduled(&job).await;
                    });
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}
