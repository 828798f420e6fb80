pub mod cron_parser;
pub mod job_store;
pub mod registry;
pub mod run_log;
pub mod scheduler;

pub use cron_parser::{next_after, next_after_in, parse_schedule, validate_cron};
pub use job_store::SqliteJobStore;
pub use registry::{EntryId, JobRegistry};
pub use run_log::SqliteRunLog;
pub use scheduler::{ReconcileReport, Scheduler};
