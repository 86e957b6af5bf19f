//! 选课服务错误类型
//!
//! 定义服务层的业务错误和系统错误

use chrono::{DateTime, Utc};
use thiserror::Error;

use enrollment_shared::error::StoreError;

/// 选课服务错误类型
#[derive(Debug, Error)]
pub enum EnrollError {
    // === 课程相关错误 ===
    #[error("课程不存在: {0}")]
    CourseNotFound(String),

    // === 邀请相关错误 ===
    #[error("邀请码无效或已被使用: {0}")]
    InvitationNotFound(String),

    #[error("邀请码已过期: code={code}, expired_at={expired_at}")]
    InvitationExpired {
        code: String,
        expired_at: DateTime<Utc>,
    },

    #[error("邀请码生成冲突超过重试上限: attempts={attempts}")]
    CodeCollisionExhausted { attempts: u32 },

    // === 参数错误 ===
    #[error("参数校验失败: {0}")]
    Validation(String),

    // === 系统错误 ===
    #[error("持久化存储错误: {0}")]
    Store(#[from] StoreError),

    #[error("JSON 序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 选课服务 Result 类型别名
pub type Result<T> = std::result::Result<T, EnrollError>;

impl EnrollError {
    /// 检查是否为可重试的错误
    ///
    /// 邀请码生成冲突是瞬时的，整个创建操作可安全重放；
    /// 存储错误视底层后端情况重试。业务校验类错误重试无意义。
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::CodeCollisionExhausted { .. } | Self::Store(_))
    }

    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        !matches!(
            self,
            Self::Store(_) | Self::Serialization(_) | Self::Internal(_)
        )
    }

    /// 获取错误码（用于外部接口响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::CourseNotFound(_) => "COURSE_NOT_FOUND",
            Self::InvitationNotFound(_) => "INVITATION_NOT_FOUND",
            Self::InvitationExpired { .. } => "INVITATION_EXPIRED",
            Self::CodeCollisionExhausted { .. } => "CODE_COLLISION_EXHAUSTED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Store(_) => "STORE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
