use crate::message::AlertMessage;
use anyhow::Result;
use async_trait::async_trait;

/// 发送结果
#[derive(Debug, Clone)]
pub struct NotifyResult {
    pub success: bool,
    pub message: String,
}

impl NotifyResult {
    pub fn success() -> Self {
        Self {
            success: true,
            message: "Notification sent successfully".to_string(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// 通知渠道 trait
///
/// send 返回 Err 表示渠道自身出错（网络、协议），
/// 返回 Ok(failure) 表示对端明确拒绝。两者都不影响其他渠道。
#[async_trait]
pub trait Notifier: Send + Sync {
    /// 发送通知
    async fn send(&self, message: &AlertMessage) -> Result<NotifyResult>;

    /// 渠道名称
    fn name(&self) -> &str;
}
