//! Transport seam between rendering and the network.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use cronpilot_core::EmailConfig;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

/// Delivers rendered notifications.
#[async_trait]
pub trait Dispatch: Send + Sync {
    async fn send_email(&self, config: &EmailConfig, subject: &str, html: &str) -> Result<()>;

    async fn post_webhook(&self, url: &str, payload: &Value) -> Result<()>;
}

/// SMTP via lettre, webhooks via reqwest.
pub struct NetworkDispatch {
    http_client: Client,
    smtp_timeout: Duration,
}

impl NetworkDispatch {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build webhook HTTP client")?;
        Ok(Self {
            http_client,
            smtp_timeout: timeout,
        })
    }

    fn build_message(config: &EmailConfig, subject: &str, html: &str) -> Result<Message> {
        if config.to.is_empty() {
            bail!("email notification has no recipients");
        }
        let from: Mailbox = config
            .from
            .parse()
            .with_context(|| format!("invalid sender address '{}'", config.from))?;
        let mut builder = Message::builder().from(from).subject(subject);
        for to in &config.to {
            let mailbox: Mailbox = to
                .parse()
                .with_context(|| format!("invalid recipient address '{}'", to))?;
            builder = builder.to(mailbox);
        }
        builder
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())
            .context("failed to build email")
    }

    fn build_transport(&self, config: &EmailConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let mut builder = if config.enable_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                .with_context(|| format!("invalid SMTP host '{}'", config.smtp_host))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
        };
        builder = builder.port(config.smtp_port).timeout(Some(self.smtp_timeout));
        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }
        Ok(builder.build())
    }
}

#[async_trait]
impl Dispatch for NetworkDispatch {
    async fn send_email(&self, config: &EmailConfig, subject: &str, html: &str) -> Result<()> {
        let message = Self::build_message(config, subject, html)?;
        let transport = self.build_transport(config)?;
        transport
            .send(message)
            .await
            .with_context(|| format!("SMTP delivery via {}:{} failed", config.smtp_host, config.smtp_port))?;
        Ok(())
    }

    async fn post_webhook(&self, url: &str, payload: &Value) -> Result<()> {
        let resp = self
            .http_client
            .post(url)
            .json(payload)
            .send()
            .await
            .context("webhook request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("webhook returned {}: {}", status, body);
        }

        // Robot endpoints report rejections in the body with a 200 status.
        let body: Value = resp.json().await.unwrap_or(Value::Null);
        if let Some(code) = body.get("errcode").and_then(Value::as_i64) {
            if code != 0 {
                let msg = body.get("errmsg").and_then(Value::as_str).unwrap_or("");
                bail!("webhook rejected message: errcode {} {}", code, msg);
            }
        }
        debug!(status = %status, "webhook accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn dispatch() -> NetworkDispatch {
        NetworkDispatch::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn webhook_posts_json_payload() {
        let server = MockServer::start().await;
        let payload = json!({"msgtype": "markdown", "markdown": {"content": "hi"}});
        Mock::given(method("POST"))
            .and(path("/robot"))
            .and(body_json(&payload))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"errcode": 0, "errmsg": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        dispatch()
            .post_webhook(&format!("{}/robot", server.uri()), &payload)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn webhook_non_2xx_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = dispatch()
            .post_webhook(&server.uri(), &json!({}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn webhook_errcode_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"errcode": 310000, "errmsg": "sign not match"})),
            )
            .mount(&server)
            .await;

        let err = dispatch()
            .post_webhook(&server.uri(), &json!({}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("310000"));
    }

    #[test]
    fn message_requires_valid_addresses() {
        let mut cfg = EmailConfig {
            smtp_host: "smtp.example.test".into(),
            smtp_port: 25,
            from: "ops@example.test".into(),
            to: vec!["dev@example.test".into()],
            ..Default::default()
        };
        assert!(NetworkDispatch::build_message(&cfg, "s", "<p>b</p>").is_ok());

        cfg.to = vec![];
        assert!(NetworkDispatch::build_message(&cfg, "s", "b").is_err());

        cfg.to = vec!["not an address".into()];
        assert!(NetworkDispatch::build_message(&cfg, "s", "b").is_err());
    }
}
