use thiserror::Error;

/// 存储层错误
#[derive(Error, Debug)]
pub enum StoreError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// 记录不存在
    #[error("Record not found: {0}")]
    NotFound(String),

    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// 创建记录不存在错误
    pub fn not_found(what: impl Into<String>) -> Self {
        StoreError::NotFound(what.into())
    }
}

/// 存储层结果类型
pub type Result<T> = std::result::Result<T, StoreError>;
