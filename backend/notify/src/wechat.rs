//! WeChat-Work-style robot payloads.

use cronpilot_core::WeChatConfig;
use serde_json::{json, Value};

use crate::render::Summary;

pub fn payload(config: &WeChatConfig, summary: &Summary) -> Value {
    let color = if summary.success { "info" } else { "warning" };
    let mut details = format!(
        "Job: {}\nStatus: {}\nStarted: {}\nFinished: {}\nDuration: {}",
        summary.job_name,
        summary.status_word(),
        summary.started,
        summary.finished,
        summary.duration
    );
    if !summary.output.is_empty() {
        details.push_str(&format!("\nOutput: {}", summary.output));
    }
    if !summary.error.is_empty() {
        details.push_str(&format!("\nError: {}", summary.error));
    }

    let mut content = format!(
        "## Job execution report\n\n<font color=\"{}\">Job {} {}</font>\n\n{}",
        color,
        summary.job_name,
        summary.status_word(),
        details
    );

    let mentions = mentions(config);
    if !mentions.is_empty() {
        content.push_str("\n\n");
        content.push_str(&mentions.join(" "));
    }

    json!({
        "msgtype": "markdown",
        "markdown": { "content": content },
    })
}

/// `@all` replaces individual mentions.
fn mentions(config: &WeChatConfig) -> Vec<String> {
    if config.at_all {
        vec!["@all".to_string()]
    } else {
        config.at_user_ids.iter().map(|id| format!("<@{}>", id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::sample;

    fn content(cfg: &WeChatConfig, success: bool) -> String {
        payload(cfg, &sample(success))["markdown"]["content"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn status_color_follows_outcome() {
        let cfg = WeChatConfig::default();
        assert!(content(&cfg, true).contains("<font color=\"info\">Job nightly backup succeeded</font>"));
        assert!(content(&cfg, false).contains("<font color=\"warning\">Job nightly backup failed</font>"));
        assert_eq!(payload(&cfg, &sample(true))["msgtype"], "markdown");
    }

    #[test]
    fn mention_tokens_are_appended() {
        let users = WeChatConfig {
            at_user_ids: vec!["alice".into(), "bob".into()],
            ..Default::default()
        };
        assert!(content(&users, false).ends_with("\n\n<@alice> <@bob>"));

        let all = WeChatConfig {
            at_user_ids: vec!["alice".into()],
            at_all: true,
            ..Default::default()
        };
        let c = content(&all, false);
        assert!(c.ends_with("\n\n@all"));
        assert!(!c.contains("<@alice>"));

        assert!(content(&WeChatConfig::default(), true).ends_with("Output: done"));
    }
}
