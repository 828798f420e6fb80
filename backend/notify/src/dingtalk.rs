//! DingTalk-style robot payloads.

use anyhow::Result;
use cronpilot_core::DingTalkConfig;
use serde_json::{json, Value};

use crate::render::Summary;
use crate::signing::signed_url;

pub fn payload(config: &DingTalkConfig, summary: &Summary) -> Value {
    let status = if summary.success { "✅ Success" } else { "❌ Failure" };
    let mut text = format!(
        "## Job execution report\n\n**Job:** {}\n\n**Status:** {}\n\n**Started:** {}\n\n**Finished:** {}\n\n**Duration:** {}",
        summary.job_name, status, summary.started, summary.finished, summary.duration
    );
    if !summary.output.is_empty() {
        text.push_str(&format!("\n\n**Output:**\n```\n{}\n```", summary.output));
    }
    if !summary.error.is_empty() {
        text.push_str(&format!("\n\n**Error:**\n```\n{}\n```", summary.error));
    }

    let mut payload = json!({
        "msgtype": "markdown",
        "markdown": {
            "title": format!("Job execution report - {}", summary.job_name),
            "text": text,
        },
    });
    if !config.at_mobiles.is_empty() || config.at_all {
        payload["at"] = json!({
            "atMobiles": config.at_mobiles,
            "isAtAll": config.at_all,
        });
    }
    payload
}

/// The URL to post to: signed when a secret is configured.
pub fn target_url(config: &DingTalkConfig, timestamp_ms: i64) -> Result<String> {
    match config.secret.as_deref() {
        Some(secret) if !secret.is_empty() => signed_url(&config.webhook_url, secret, timestamp_ms),
        _ => Ok(config.webhook_url.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::sample;
    use crate::signing::sign;

    fn config() -> DingTalkConfig {
        DingTalkConfig {
            webhook_url: "https://oapi.example.test/robot/send?access_token=t".into(),
            ..Default::default()
        }
    }

    #[test]
    fn markdown_payload_without_mentions() {
        let p = payload(&config(), &sample(false));
        assert_eq!(p["msgtype"], "markdown");
        assert_eq!(p["markdown"]["title"], "Job execution report - nightly backup");
        let text = p["markdown"]["text"].as_str().unwrap();
        assert!(text.starts_with("## Job execution report"));
        assert!(text.contains("❌ Failure"));
        assert!(text.contains("**Error:**\n```\nexit status 2\n```"));
        assert!(!text.contains("**Output:**"));
        assert!(p.get("at").is_none());
    }

    #[test]
    fn mentions_add_at_block() {
        let mut cfg = config();
        cfg.at_mobiles = vec!["13800000000".into()];
        let p = payload(&cfg, &sample(true));
        assert_eq!(p["at"]["atMobiles"][0], "13800000000");
        assert_eq!(p["at"]["isAtAll"], false);

        let mut all = config();
        all.at_all = true;
        assert_eq!(payload(&all, &sample(true))["at"]["isAtAll"], true);
    }

    #[test]
    fn target_url_signs_only_with_secret() {
        assert_eq!(target_url(&config(), 5).unwrap(), config().webhook_url);

        let mut blank = config();
        blank.secret = Some(String::new());
        assert_eq!(target_url(&blank, 5).unwrap(), blank.webhook_url);

        let mut signed = config();
        signed.secret = Some("SECabc".into());
        let url = target_url(&signed, 1_700_000_000_000).unwrap();
        let parsed = url::Url::parse(&url).unwrap();
        let sig = parsed.query_pairs().find(|(k, _)| k == "sign").unwrap().1.into_owned();
        assert_eq!(sig, sign("SECabc", 1_700_000_000_000).unwrap());
    }
}
