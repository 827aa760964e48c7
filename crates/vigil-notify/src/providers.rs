use crate::message::AlertMessage;
use crate::notifier::{Notifier, NotifyResult};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 所有 HTTP 渠道统一的请求超时
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// 邮件通知
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    pub from: String,
    #[serde(default = "default_use_tls")]
    pub use_tls: bool,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_use_tls() -> bool {
    true
}

pub struct EmailNotifier {
    config: EmailConfig,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// 构造邮件，收件人就是发件人自己
    fn build_email(&self, message: &AlertMessage) -> Result<lettre::Message> {
        use lettre::message::header::ContentType;
        use lettre::Message;

        let email = Message::builder()
            .from(self.config.from.parse()?)
            .to(self.config.from.parse()?)
            .subject("Server Check Alert")
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())?;
        Ok(email)
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, message: &AlertMessage) -> Result<NotifyResult> {
        use lettre::transport::smtp::authentication::Credentials;
        use lettre::{SmtpTransport, Transport};

        let email = self.build_email(message)?;

        let mut builder = if self.config.use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host)?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        };
        builder = builder
            .port(self.config.smtp_port)
            .timeout(Some(REQUEST_TIMEOUT));

        if let (Some(username), Some(password)) = (&self.config.username, &self.config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let mailer = builder.build();
        match mailer.send(&email) {
            Ok(_) => Ok(NotifyResult::success()),
            Err(e) => Ok(NotifyResult::failure(format!("Email send failed: {}", e))),
        }
    }

    fn name(&self) -> &str {
        "email"
    }
}

// ============================================================================
// Telegram 通知
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

pub struct TelegramNotifier {
    config: TelegramConfig,
    client: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn build_payload(&self, message: &AlertMessage) -> serde_json::Value {
        serde_json::json!({
            "chat_id": self.config.chat_id,
            "text": message.body,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &AlertMessage) -> Result<NotifyResult> {
        let url = format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.config.bot_token
        );
        let response = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(&self.build_payload(message))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(NotifyResult::success())
        } else {
            Ok(NotifyResult::failure(format!(
                "Telegram failed with status: {}",
                response.status()
            )))
        }
    }

    fn name(&self) -> &str {
        "telegram"
    }
}

// ============================================================================
// Slack 通知
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    pub webhook_url: String,
    #[serde(default)]
    pub channel: Option<String>,
}

pub struct SlackNotifier {
    config: SlackConfig,
    client: reqwest::Client,
}

impl SlackNotifier {
    pub fn new(config: SlackConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn build_payload(&self, message: &AlertMessage) -> serde_json::Value {
        let mut payload = serde_json::json!({
            "text": "🚨 Server Check Alert",
            "attachments": [
                {
                    "color": "danger",
                    "text": message.body,
                    "footer": "Server Check",
                    "ts": message.timestamp.timestamp(),
                }
            ]
        });
        if let Some(channel) = &self.config.channel {
            payload["channel"] = serde_json::Value::String(channel.clone());
        }
        payload
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, message: &AlertMessage) -> Result<NotifyResult> {
        let response = self
            .client
            .post(&self.config.webhook_url)
            .timeout(REQUEST_TIMEOUT)
            .json(&self.build_payload(message))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(NotifyResult::success())
        } else {
            Ok(NotifyResult::failure(format!(
                "Slack failed with status: {}",
                response.status()
            )))
        }
    }

    fn name(&self) -> &str {
        "slack"
    }
}

// ============================================================================
// Discord 通知
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub webhook_url: String,
}

pub struct DiscordNotifier {
    config: DiscordConfig,
    client: reqwest::Client,
}

impl DiscordNotifier {
    pub fn new(config: DiscordConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn build_payload(&self, message: &AlertMessage) -> serde_json::Value {
        serde_json::json!({
            "content": "🚨 **Server Check Alert**",
            "embeds": [
                {
                    "title": "Alert Notification",
                    "description": message.body,
                    "color": 15158332,
                    "timestamp": message.timestamp.to_rfc3339(),
                    "footer": { "text": "Server Check" },
                }
            ]
        })
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, message: &AlertMessage) -> Result<NotifyResult> {
        let response = self
            .client
            .post(&self.config.webhook_url)
            .timeout(REQUEST_TIMEOUT)
            .json(&self.build_payload(message))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(NotifyResult::success())
        } else {
            Ok(NotifyResult::failure(format!(
                "Discord failed with status: {}",
                response.status()
            )))
        }
    }

    fn name(&self) -> &str {
        "discord"
    }
}

// ============================================================================
// 通用 Webhook 通知
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub url: String,
}

pub struct WebhookNotifier {
    config: WebhookConfig,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(config: WebhookConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn build_payload(&self, message: &AlertMessage) -> serde_json::Value {
        serde_json::json!({ "message": message.body })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, message: &AlertMessage) -> Result<NotifyResult> {
        let response = self
            .client
            .post(&self.config.url)
            .timeout(REQUEST_TIMEOUT)
            .json(&self.build_payload(message))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(NotifyResult::success())
        } else {
            Ok(NotifyResult::failure(format!(
                "Webhook failed with status: {}",
                response.status()
            )))
        }
    }

    fn name(&self) -> &str {
        "webhook"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::Severity;

    fn message() -> AlertMessage {
        AlertMessage::new(
            "Rule 'CPU 过高' triggered on target 3: cpu > 90 (value=95)",
            Severity::Critical,
        )
    }

    #[test]
    fn test_telegram_payload() {
        let notifier = TelegramNotifier::new(TelegramConfig {
            bot_token: "123:abc".to_string(),
            chat_id: "-100200300".to_string(),
        });
        let payload = notifier.build_payload(&message());
        assert_eq!(payload["chat_id"], "-100200300");
        assert!(payload["text"].as_str().unwrap().contains("cpu > 90"));
    }

    #[test]
    fn test_slack_payload_channel_is_optional() {
        let without = SlackNotifier::new(SlackConfig {
            webhook_url: "https://hooks.slack.com/xxx".to_string(),
            channel: None,
        });
        let payload = without.build_payload(&message());
        assert_eq!(payload["text"], "🚨 Server Check Alert");
        assert_eq!(payload["attachments"][0]["color"], "danger");
        assert_eq!(payload["attachments"][0]["footer"], "Server Check");
        assert!(payload.get("channel").is_none());

        let with = SlackNotifier::new(SlackConfig {
            webhook_url: "https://hooks.slack.com/xxx".to_string(),
            channel: Some("#ops".to_string()),
        });
        assert_eq!(with.build_payload(&message())["channel"], "#ops");
    }

    #[test]
    fn test_discord_payload() {
        let notifier = DiscordNotifier::new(DiscordConfig {
            webhook_url: "https://discord.com/api/webhooks/xxx".to_string(),
        });
        let payload = notifier.build_payload(&message());
        assert_eq!(payload["content"], "🚨 **Server Check Alert**");
        assert_eq!(payload["embeds"][0]["title"], "Alert Notification");
        assert_eq!(payload["embeds"][0]["color"], 15158332);
        assert_eq!(payload["embeds"][0]["footer"]["text"], "Server Check");
    }

    #[test]
    fn test_webhook_payload_is_flat_message() {
        let notifier = WebhookNotifier::new(WebhookConfig {
            url: "https://example.com/hook".to_string(),
        });
        let payload = notifier.build_payload(&message());
        assert_eq!(
            payload,
            serde_json::json!({ "message": message().body })
        );
    }

    #[test]
    fn test_email_build() {
        let notifier = EmailNotifier::new(EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            username: Some("alerts".to_string()),
            password: Some("secret".to_string()),
            from: "alerts@example.com".to_string(),
            use_tls: true,
        });
        assert!(notifier.build_email(&message()).is_ok());
        assert_eq!(notifier.name(), "email");
    }

    #[test]
    fn test_email_config_defaults() {
        let config: EmailConfig = serde_json::from_str(
            r#"{"smtp_host": "smtp.example.com", "from": "a@b.c"}"#,
        )
        .unwrap();
        assert_eq!(config.smtp_port, 587);
        assert!(config.use_tls);
        assert!(config.username.is_none());
    }
}
