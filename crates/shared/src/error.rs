//! 共享错误类型
//!
//! 定义持久化存储边界的错误类型，使用 thiserror 提供良好的错误信息。

use thiserror::Error;

/// 持久化存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("存储 IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("存储序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("存储后端错误: {0}")]
    Backend(String),
}

/// 存储层 Result 类型别名
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// 是否为可重试错误
    ///
    /// IO 类故障（磁盘抖动、文件被占用）通常是瞬时的；
    /// 序列化失败意味着数据损坏，重试无意义。
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Backend(_))
    }
}
