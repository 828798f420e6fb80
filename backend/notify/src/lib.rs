//! Outcome notifications for Cronpilot.
//!
//! The [`Notifier`] evaluates a job's notification policy against an
//! [`ExecutionRecord`](cronpilot_core::ExecutionRecord) and fans the rendered
//! message out to each configured channel through a [`Dispatch`]
//! implementation.

pub mod dingtalk;
pub mod dispatch;
pub mod email;
pub mod notifier;
pub mod render;
pub mod signing;
pub mod wechat;

pub use dispatch::{Dispatch, NetworkDispatch};
pub use notifier::Notifier;
pub use render::Summary;
