//! Timestamped HMAC signing for robot webhooks.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::Url;

/// `base64(HMAC-SHA256(secret, "{timestamp_ms}\n{secret}"))`.
pub fn sign(secret: &str, timestamp_ms: i64) -> Result<String> {
    let string_to_sign = format!("{}\n{}", timestamp_ms, secret);
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .context("invalid HMAC key")?;
    mac.update(string_to_sign.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Append `timestamp` and `sign` query parameters to `webhook_url`,
/// keeping any query it already has.
pub fn signed_url(webhook_url: &str, secret: &str, timestamp_ms: i64) -> Result<String> {
    let mut url = Url::parse(webhook_url)
        .with_context(|| format!("invalid webhook url: {}", cronpilot_logging::redact_sensitive_data(webhook_url)))?;
    let signature = sign(secret, timestamp_ms)?;
    url.query_pairs_mut()
        .append_pair("timestamp", &timestamp_ms.to_string())
        .append_pair("sign", &signature);
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(url: &str, key: &str) -> Option<String> {
        Url::parse(url)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn signature_matches_independent_hmac() {
        let secret = "SEC000example";
        let ts = 1_700_000_000_123_i64;

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{ts}\n{secret}").as_bytes());
        let expected = STANDARD.encode(mac.finalize().into_bytes());

        assert_eq!(sign(secret, ts).unwrap(), expected);
        assert_ne!(sign(secret, ts + 1).unwrap(), expected);
    }

    #[test]
    fn signed_url_appends_to_existing_query() {
        let secret = "s3cret";
        let ts = 1_700_000_000_000_i64;
        let url = signed_url("https://oapi.example.test/robot/send?access_token=tok", secret, ts).unwrap();

        assert!(url.starts_with("https://oapi.example.test/robot/send?access_token=tok&timestamp="));
        assert_eq!(query(&url, "access_token").as_deref(), Some("tok"));
        assert_eq!(query(&url, "timestamp").as_deref(), Some("1700000000000"));
        let ts_in_url: i64 = query(&url, "timestamp").unwrap().parse().unwrap();
        assert_eq!(query(&url, "sign").unwrap(), sign(secret, ts_in_url).unwrap());
    }

    #[test]
    fn signed_url_starts_query_when_absent() {
        let url = signed_url("https://hooks.example.test/robot", "k", 42).unwrap();
        assert!(url.starts_with("https://hooks.example.test/robot?timestamp=42&sign="));
    }

    #[test]
    fn signed_url_rejects_garbage() {
        assert!(signed_url("not a url", "k", 1).is_err());
    }
}
