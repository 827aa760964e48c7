use crate::message::AlertMessage;
use crate::notifier::Notifier;
use crate::providers::{
    DiscordConfig, DiscordNotifier, EmailConfig, EmailNotifier, SlackConfig, SlackNotifier,
    TelegramConfig, TelegramNotifier, WebhookConfig, WebhookNotifier,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// 通知渠道配置
///
/// 缺省的渠道不会被注册。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub email: Option<EmailConfig>,
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
    #[serde(default)]
    pub slack: Option<SlackConfig>,
    #[serde(default)]
    pub discord: Option<DiscordConfig>,
    #[serde(default)]
    pub webhook: Option<WebhookConfig>,
}

/// 告警分发器
///
/// 按注册顺序逐个渠道发送。单渠道失败只记日志，
/// 不影响其他渠道，也绝不向调用方传播。
pub struct AlertDispatcher {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl AlertDispatcher {
    pub fn new() -> Self {
        Self {
            notifiers: Vec::new(),
        }
    }

    /// 按配置装配渠道，顺序固定：email、telegram、slack、discord、webhook
    pub fn from_config(config: &NotifyConfig) -> Self {
        let mut dispatcher = Self::new();
        if let Some(email) = &config.email {
            dispatcher.register(Box::new(EmailNotifier::new(email.clone())));
        }
        if let Some(telegram) = &config.telegram {
            dispatcher.register(Box::new(TelegramNotifier::new(telegram.clone())));
        }
        if let Some(slack) = &config.slack {
            dispatcher.register(Box::new(SlackNotifier::new(slack.clone())));
        }
        if let Some(discord) = &config.discord {
            dispatcher.register(Box::new(DiscordNotifier::new(discord.clone())));
        }
        if let Some(webhook) = &config.webhook {
            dispatcher.register(Box::new(WebhookNotifier::new(webhook.clone())));
        }
        dispatcher
    }

    /// 注册通知渠道
    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        info!("Registered notifier: {}", notifier.name());
        self.notifiers.push(notifier);
    }

    pub fn channel_count(&self) -> usize {
        self.notifiers.len()
    }

    /// 顺序广播到全部渠道
    pub async fn broadcast(&self, message: &AlertMessage) {
        if self.notifiers.is_empty() {
            return;
        }
        info!(
            severity = message.severity.as_str(),
            channels = self.notifiers.len(),
            "Dispatching alert notification"
        );
        for notifier in &self.notifiers {
            match notifier.send(message).await {
                Ok(result) if result.success => {
                    info!("Notification sent via {}", notifier.name());
                }
                Ok(result) => {
                    error!(
                        "Notification failed via {}: {}",
                        notifier.name(),
                        result.message
                    );
                }
                Err(e) => {
                    error!("Notification error via {}: {}", notifier.name(), e);
                }
            }
        }
    }
}

impl Default for AlertDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::NotifyResult;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use vigil_core::Severity;

    struct CountingNotifier {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for CountingNotifier {
        async fn send(&self, _message: &AlertMessage) -> Result<NotifyResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("simulated channel failure");
            }
            Ok(NotifyResult::success())
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_broadcast_with_no_channels_is_noop() {
        let dispatcher = AlertDispatcher::new();
        dispatcher
            .broadcast(&AlertMessage::new("没有渠道", Severity::Warning))
            .await;
    }

    #[tokio::test]
    async fn test_broadcast_continues_past_failing_channel() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let mut dispatcher = AlertDispatcher::new();
        dispatcher.register(Box::new(CountingNotifier {
            calls: first.clone(),
            fail: true,
        }));
        dispatcher.register(Box::new(CountingNotifier {
            calls: second.clone(),
            fail: false,
        }));

        dispatcher
            .broadcast(&AlertMessage::new("cpu > 90", Severity::Critical))
            .await;

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_from_config_registers_only_present_channels() {
        let config = NotifyConfig {
            telegram: Some(crate::providers::TelegramConfig {
                bot_token: "123:abc".to_string(),
                chat_id: "42".to_string(),
            }),
            ..Default::default()
        };
        let dispatcher = AlertDispatcher::from_config(&config);
        assert_eq!(dispatcher.channel_count(), 1);

        let empty = AlertDispatcher::from_config(&NotifyConfig::default());
        assert_eq!(empty.channel_count(), 0);
    }
}
