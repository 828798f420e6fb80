pub mod error;
pub mod job;
pub mod notification;
pub mod record;
pub mod store;
pub mod template;

pub use error::CronpilotError;
pub use job::{Job, JobKind, NewJob, DEFAULT_HTTP_METHOD};
pub use notification::{
    parse_channels, Channel, DingTalkConfig, EmailConfig, NotificationConfig, WeChatConfig,
};
pub use record::{ExecutionRecord, RecordBuilder};
pub use store::{ExecutionLogStore, JobStore};
pub use template::{JobPatch, JobTemplate};
