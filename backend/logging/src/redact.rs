//! Log Redaction Layer
//!
//! Scrubs webhook signing parameters, access tokens, and API keys from
//! strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

static QUERY_SECRET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)([?&](?:sign|access_token|key)=)[^&#\s]+").unwrap());
static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(sk-[a-zA-Z0-9]{32,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    // Query values keep their parameter name so the URL shape stays readable
    let redacted = QUERY_SECRET_RE.replace_all(input, "${1}[REDACTED]");

    API_KEY_RE.replace_all(&redacted, "[REDACTED_TOKEN]").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction() {
        let raw = "Posting with Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9"));
        assert!(clean.contains("[REDACTED_TOKEN]"));
    }

    #[test]
    fn test_webhook_query_redaction() {
        let url = "https://oapi.example.test/robot/send?access_token=abc123&timestamp=1700000000000&sign=q%2Bz%3D";
        let clean = redact_sensitive_data(url);
        assert_eq!(
            clean,
            "https://oapi.example.test/robot/send?access_token=[REDACTED]&timestamp=1700000000000&sign=[REDACTED]"
        );

        let wechat = "https://qyapi.example.test/cgi-bin/webhook/send?key=693a91f6";
        assert_eq!(
            redact_sensitive_data(wechat),
            "https://qyapi.example.test/cgi-bin/webhook/send?key=[REDACTED]"
        );
    }

    #[test]
    fn test_plain_text_untouched() {
        let line = "job backup finished in 1.204s";
        assert_eq!(redact_sensitive_data(line), line);
    }
}
