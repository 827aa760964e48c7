use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use vigil_notify::{DiscordConfig, EmailConfig, SlackConfig, TelegramConfig, WebhookConfig};

/// 应用配置
///
/// 所有段都可以缺省，配置文件不存在时按默认值启动。
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
}

/// 采集与保留策略
#[derive(Debug, Deserialize, Clone)]
pub struct MonitorConfig {
    #[serde(default = "default_probe_interval")]
    pub probe_interval_seconds: u64,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default = "default_probe_deadline")]
    pub probe_deadline_seconds: u64,
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_seconds: u64,
    #[serde(default = "default_shell_timeout")]
    pub shell_timeout_seconds: u64,
    #[serde(default = "default_snmp_timeout")]
    pub snmp_timeout_seconds: u64,
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    #[serde(default = "default_retention_interval")]
    pub retention_interval_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecurityConfig {
    /// 凭据加解密密钥，生产环境必须改掉默认值
    #[serde(default = "default_encryption_key")]
    pub encryption_key: String,
}

/// 通知渠道配置（扁平键）
///
/// 渠道的必填键配齐才会启用该渠道。
#[derive(Debug, Deserialize, Clone)]
pub struct NotifyConfig {
    #[serde(default)]
    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_username: Option<String>,
    #[serde(default)]
    pub smtp_password: Option<String>,
    #[serde(default)]
    pub smtp_from: Option<String>,
    #[serde(default = "default_smtp_use_tls")]
    pub smtp_use_tls: bool,
    #[serde(default)]
    pub telegram_bot_token: Option<String>,
    #[serde(default)]
    pub telegram_chat_id: Option<String>,
    #[serde(default)]
    pub slack_webhook_url: Option<String>,
    #[serde(default)]
    pub slack_channel: Option<String>,
    #[serde(default)]
    pub discord_webhook_url: Option<String>,
    #[serde(default)]
    pub webhook_url: Option<String>,
}

impl NotifyConfig {
    /// 扁平键映射成分渠道配置
    pub fn channels(&self) -> vigil_notify::NotifyConfig {
        let email = match (&self.smtp_host, &self.smtp_from) {
            (Some(host), Some(from)) => Some(EmailConfig {
                smtp_host: host.clone(),
                smtp_port: self.smtp_port,
                username: self.smtp_username.clone(),
                password: self.smtp_password.clone(),
                from: from.clone(),
                use_tls: self.smtp_use_tls,
            }),
            _ => None,
        };

        let telegram = match (&self.telegram_bot_token, &self.telegram_chat_id) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig {
                bot_token: bot_token.clone(),
                chat_id: chat_id.clone(),
            }),
            _ => None,
        };

        let slack = self.slack_webhook_url.as_ref().map(|url| SlackConfig {
            webhook_url: url.clone(),
            channel: self.slack_channel.clone(),
        });

        let discord = self.discord_webhook_url.as_ref().map(|url| DiscordConfig {
            webhook_url: url.clone(),
        });

        let webhook = self
            .webhook_url
            .as_ref()
            .map(|url| WebhookConfig { url: url.clone() });

        vigil_notify::NotifyConfig {
            email,
            telegram,
            slack,
            discord,
            webhook,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl AppConfig {
    /// 从 TOML 文件加载，VIGIL_ 前缀环境变量覆盖文件值，文件不存在时按默认值启动
    pub fn load(path: &str) -> Result<AppConfig> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("VIGIL").separator("__"))
            .build()?;

        let app_config: AppConfig = settings.try_deserialize()?;
        Ok(app_config)
    }
}

// 默认值函数
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_database_url() -> String {
    "sqlite://vigil.db?mode=rwc".to_string()
}

fn default_probe_interval() -> u64 {
    60
}

fn default_max_concurrency() -> usize {
    10
}

fn default_probe_deadline() -> u64 {
    45
}

fn default_ping_timeout() -> u64 {
    3
}

fn default_shell_timeout() -> u64 {
    10
}

fn default_snmp_timeout() -> u64 {
    5
}

fn default_retention_days() -> i64 {
    30
}

fn default_retention_interval() -> u64 {
    86400
}

fn default_encryption_key() -> String {
    "change-me".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_use_tls() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

// Default trait 实现
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            probe_interval_seconds: default_probe_interval(),
            max_concurrency: default_max_concurrency(),
            probe_deadline_seconds: default_probe_deadline(),
            ping_timeout_seconds: default_ping_timeout(),
            shell_timeout_seconds: default_shell_timeout(),
            snmp_timeout_seconds: default_snmp_timeout(),
            retention_days: default_retention_days(),
            retention_interval_seconds: default_retention_interval(),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            encryption_key: default_encryption_key(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_username: None,
            smtp_password: None,
            smtp_from: None,
            smtp_use_tls: default_smtp_use_tls(),
            telegram_bot_token: None,
            telegram_chat_id: None,
            slack_webhook_url: None,
            slack_channel: None,
            discord_webhook_url: None,
            webhook_url: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            monitor: MonitorConfig::default(),
            security: SecurityConfig::default(),
            notify: NotifyConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load("/nonexistent/vigil-config").unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.url, "sqlite://vigil.db?mode=rwc");
        assert_eq!(config.monitor.probe_interval_seconds, 60);
        assert_eq!(config.monitor.max_concurrency, 10);
        assert_eq!(config.monitor.retention_days, 30);
        assert_eq!(config.security.encryption_key, "change-me");
        assert_eq!(config.logging.level, "info");
        assert!(config.notify.smtp_host.is_none());
        assert_eq!(config.notify.smtp_port, 587);
        assert!(config.notify.smtp_use_tls);
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 9090

[monitor]
probe_interval_seconds = 15
retention_days = 7

[security]
encryption_key = "机房一号密钥"

[notify]
smtp_host = "smtp.example.com"
smtp_from = "alerts@example.com"
smtp_use_tls = false

[logging]
level = "debug"
"#,
        )
        .unwrap();

        let config = AppConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.monitor.probe_interval_seconds, 15);
        assert_eq!(config.monitor.retention_days, 7);
        assert_eq!(config.monitor.max_concurrency, 10);
        assert_eq!(config.security.encryption_key, "机房一号密钥");
        assert_eq!(config.logging.level, "debug");

        let channels = config.notify.channels();
        let email = channels.email.unwrap();
        assert_eq!(email.smtp_host, "smtp.example.com");
        assert_eq!(email.smtp_port, 587);
        assert!(!email.use_tls);
        assert!(channels.telegram.is_none());
    }

    #[test]
    fn test_email_needs_both_host_and_from() {
        let notify = NotifyConfig {
            smtp_host: Some("smtp.example.com".to_string()),
            ..Default::default()
        };
        assert!(notify.channels().email.is_none());

        let notify = NotifyConfig {
            smtp_from: Some("alerts@example.com".to_string()),
            ..Default::default()
        };
        assert!(notify.channels().email.is_none());
    }

    #[test]
    fn test_single_key_channels() {
        let notify = NotifyConfig {
            slack_webhook_url: Some("https://hooks.slack.com/services/T/B/x".to_string()),
            slack_channel: Some("#ops".to_string()),
            discord_webhook_url: Some("https://discord.com/api/webhooks/1/x".to_string()),
            webhook_url: Some("https://alerts.internal/hook".to_string()),
            ..Default::default()
        };

        let channels = notify.channels();
        assert_eq!(channels.slack.unwrap().channel.as_deref(), Some("#ops"));
        assert!(channels.discord.is_some());
        assert!(channels.webhook.is_some());
        assert!(channels.email.is_none());
    }

    #[test]
    fn test_telegram_needs_token_and_chat_id() {
        let notify = NotifyConfig {
            telegram_bot_token: Some("123:abc".to_string()),
            ..Default::default()
        };
        assert!(notify.channels().telegram.is_none());

        let notify = NotifyConfig {
            telegram_bot_token: Some("123:abc".to_string()),
            telegram_chat_id: Some("42".to_string()),
            ..Default::default()
        };
        let telegram = notify.channels().telegram.unwrap();
        assert_eq!(telegram.chat_id, "42");
    }
}
