//! Notification channel configuration as stored on a job row.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Per-channel settings. Any subset may be present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dingtalk: Option<DingTalkConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wechat: Option<WeChatConfig>,
}

impl NotificationConfig {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.dingtalk.is_none() && self.wechat.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub from: String,
    #[serde(default)]
    pub to: Vec<String>,
    /// Overrides the default success/failure subject line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Upgrade with STARTTLS before authenticating.
    #[serde(default)]
    pub enable_tls: bool,
}

/// DingTalk-style robot webhook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DingTalkConfig {
    pub webhook_url: String,
    /// Signing secret; when set the URL carries `timestamp` and `sign`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub at_mobiles: Vec<String>,
    #[serde(default)]
    pub at_all: bool,
}

/// WeChat-Work-style group robot webhook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeChatConfig {
    pub webhook_url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub at_user_ids: Vec<String>,
    #[serde(default)]
    pub at_all: bool,
}

/// The closed set of notification transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Email,
    DingTalk,
    WeChat,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::DingTalk => "dingtalk",
            Channel::WeChat => "wechat",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(Channel::Email),
            "dingtalk" => Ok(Channel::DingTalk),
            "wechat" => Ok(Channel::WeChat),
            other => Err(other.to_string()),
        }
    }
}

/// Decode a JSON channel list such as `["email","dingtalk"]`.
///
/// Order is preserved. Names that are not a known [`Channel`] come back as
/// `Err(name)` so the caller can log and skip them. A blank field decodes to
/// an empty list.
pub fn parse_channels(raw: &str) -> Result<Vec<Result<Channel, String>>, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let names: Vec<String> = serde_json::from_str(raw)?;
    Ok(names.iter().map(|n| n.parse::<Channel>()).collect())
}
