use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vigil_core::Severity;

/// 告警通知消息
///
/// body 是评估引擎渲染好的完整文本，各渠道原样转发。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertMessage {
    /// 消息正文
    pub body: String,

    /// 告警级别
    pub severity: Severity,

    /// 触发时间
    pub timestamp: DateTime<Utc>,
}

impl AlertMessage {
    pub fn new(body: impl Into<String>, severity: Severity) -> Self {
        Self {
            body: body.into(),
            severity,
            timestamp: Utc::now(),
        }
    }
}
