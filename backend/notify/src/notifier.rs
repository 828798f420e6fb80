//! Policy evaluation and per-channel fan-out.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use cronpilot_core::{Channel, ExecutionRecord, Job, NotificationConfig};
use cronpilot_logging::redact_sensitive_data;
use tracing::{debug, info, warn};

use crate::dispatch::{Dispatch, NetworkDispatch};
use crate::render::Summary;
use crate::{dingtalk, email, wechat};

/// Sends outcome notifications for finished executions.
///
/// Notification is best effort: nothing here returns an error to the
/// caller. Each channel is attempted independently and failures are logged.
#[derive(Clone)]
pub struct Notifier {
    dispatch: Arc<dyn Dispatch>,
}

impl Notifier {
    pub fn new(dispatch: Arc<dyn Dispatch>) -> Self {
        Self { dispatch }
    }

    /// Notifier over real SMTP and HTTP, each bounded by `timeout`.
    pub fn network(timeout: Duration) -> Result<Self> {
        Ok(Self::new(Arc::new(NetworkDispatch::new(timeout)?)))
    }

    pub async fn maybe_notify(&self, job: &Job, record: &ExecutionRecord) {
        if !job.wants_notification(record.success) {
            return;
        }

        let channels = match job.channels() {
            Ok(channels) if !channels.is_empty() => channels,
            Ok(_) => {
                debug!(job_id = job.id, "no notification channels configured");
                return;
            }
            Err(e) => {
                warn!(job_id = job.id, error = %e, "unparseable notification channel list");
                return;
            }
        };

        let config = match job.notification() {
            Ok(Some(config)) if !config.is_empty() => config,
            Ok(_) => {
                debug!(job_id = job.id, "no notification config");
                return;
            }
            Err(e) => {
                warn!(job_id = job.id, error = %e, "unparseable notification config");
                return;
            }
        };

        let summary = Summary::from_record(record);
        for entry in channels {
            let channel = match entry {
                Ok(channel) => channel,
                Err(name) => {
                    warn!(job_id = job.id, channel = %name, "unknown notification channel, skipping");
                    continue;
                }
            };
            match self.send(channel, &config, &summary).await {
                Ok(true) => {
                    info!(job_id = job.id, channel = %channel, "notification sent");
                }
                Ok(false) => {
                    debug!(job_id = job.id, channel = %channel, "channel listed without config, skipping");
                }
                Err(e) => {
                    warn!(
                        job_id = job.id,
                        channel = %channel,
                        error = %redact_sensitive_data(&format!("{:#}", e)),
                        "notification failed"
                    );
                }
            }
        }
    }

    /// Returns `Ok(false)` when the channel has no config block.
    async fn send(&self, channel: Channel, config: &NotificationConfig, summary: &Summary) -> Result<bool> {
        match channel {
            Channel::Email => {
                let Some(cfg) = &config.email else {
                    return Ok(false);
                };
                let subject = email::subject(cfg, summary);
                let body = email::html_body(summary);
                self.dispatch.send_email(cfg, &subject, &body).await?;
            }
            Channel::DingTalk => {
                let Some(cfg) = &config.dingtalk else {
                    return Ok(false);
                };
                let url = dingtalk::target_url(cfg, Utc::now().timestamp_millis())?;
                debug!(url = %redact_sensitive_data(&url), "posting DingTalk notification");
                self.dispatch.post_webhook(&url, &dingtalk::payload(cfg, summary)).await?;
            }
            Channel::WeChat => {
                let Some(cfg) = &config.wechat else {
                    return Ok(false);
                };
                debug!(url = %redact_sensitive_data(&cfg.webhook_url), "posting WeChat notification");
                self.dispatch
                    .post_webhook(&cfg.webhook_url, &wechat::payload(cfg, summary))
                    .await?;
            }
        }
        Ok(true)
    }
}
