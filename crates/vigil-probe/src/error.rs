use thiserror::Error;

/// 采集错误
///
/// 只描述单项读数为什么没拿到，永远不会让整轮探测失败。
#[derive(Error, Debug)]
pub enum CollectError {
    /// 读数在当前环境不可用
    #[error("Metric unavailable: {0}")]
    Unavailable(String),

    /// 输出解析失败
    #[error("Parse failure: {0}")]
    Parse(String),

    /// 网络或会话错误
    #[error("Transport error: {0}")]
    Transport(String),
}

impl CollectError {
    pub fn unavailable(what: impl Into<String>) -> Self {
        CollectError::Unavailable(what.into())
    }

    pub fn parse(what: impl Into<String>) -> Self {
        CollectError::Parse(what.into())
    }

    pub fn transport(what: impl Into<String>) -> Self {
        CollectError::Transport(what.into())
    }
}

impl From<std::io::Error> for CollectError {
    fn from(e: std::io::Error) -> Self {
        CollectError::Transport(e.to_string())
    }
}

impl From<ssh2::Error> for CollectError {
    fn from(e: ssh2::Error) -> Self {
        CollectError::Transport(e.to_string())
    }
}

/// 单项采集结果
pub type FieldResult<T> = Result<T, CollectError>;
