use thiserror::Error;

/// 核心领域错误类型
#[derive(Error, Debug)]
pub enum CoreError {
    /// 加密密钥无效
    #[error("Invalid encryption key: {0}")]
    InvalidKey(String),

    /// 字段值无效
    #[error("Invalid field value: {0}")]
    InvalidField(String),

    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 核心结果类型
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// 创建字段错误
    pub fn invalid_field(msg: impl Into<String>) -> Self {
        CoreError::InvalidField(msg.into())
    }
}
