//! 成就服务错误类型
//!
//! 定义服务层的业务错误和系统错误

use skillera_shared::error::StoreError;
use thiserror::Error;

use crate::models::AchievementStatus;

/// 成就服务错误类型
#[derive(Debug, Error)]
pub enum AchievementError {
    // === 校验错误 ===
    #[error("参数校验失败: {0}")]
    Validation(String),

    #[error("记录已存在: {field}={value}")]
    AlreadyExists { field: String, value: String },

    // === 不存在 ===
    #[error("用户不存在: {0}")]
    UserNotFound(String),

    #[error("成就不存在: user_id={user_id}, achievement_id={achievement_id}")]
    AchievementNotFound {
        user_id: String,
        achievement_id: String,
    },

    #[error("目标不存在: user_id={user_id}, goal_id={goal_id}")]
    GoalNotFound { user_id: String, goal_id: String },

    #[error("徽章不存在: {0}")]
    BadgeNotFound(String),

    // === 状态错误 ===
    #[error("成就状态不允许此操作: achievement_id={achievement_id}, current_status={current_status}")]
    InvalidState {
        achievement_id: String,
        current_status: AchievementStatus,
    },

    // === 持久化错误 ===
    #[error("持久化失败: {0}")]
    Persistence(#[from] StoreError),

    #[error("JSON 序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("积分账目不一致: user_id={user_id}, 记录积分 {recorded}, 已通过成就合计 {expected}")]
    PointsLedgerMismatch {
        user_id: String,
        recorded: u64,
        expected: u64,
    },

    // === 系统错误 ===
    #[error("获取锁超时: {key}")]
    LockTimeout { key: String },

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 成就服务 Result 类型别名
pub type Result<T> = std::result::Result<T, AchievementError>;

impl AchievementError {
    /// 检查是否为可重试的错误
    ///
    /// 服务层自身不重试，由调用方决定是否重新发起
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Persistence(e) => e.is_retryable(),
            Self::LockTimeout { .. } => true,
            _ => false,
        }
    }

    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        !matches!(
            self,
            Self::Persistence(_)
                | Self::Serialization(_)
                | Self::PointsLedgerMismatch { .. }
                | Self::LockTimeout { .. }
                | Self::Internal(_)
        )
    }

    /// 获取错误码（用于对外响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::AlreadyExists { .. } => "ALREADY_EXISTS",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::AchievementNotFound { .. } => "ACHIEVEMENT_NOT_FOUND",
            Self::GoalNotFound { .. } => "GOAL_NOT_FOUND",
            Self::BadgeNotFound(_) => "BADGE_NOT_FOUND",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::PointsLedgerMismatch { .. } => "POINTS_LEDGER_MISMATCH",
            Self::LockTimeout { .. } => "LOCK_TIMEOUT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_retryable() {
        let transient = AchievementError::Persistence(StoreError::Unavailable {
            backend: "file".to_string(),
            message: "busy".to_string(),
        });
        assert!(transient.is_retryable());
        assert!(
            AchievementError::LockTimeout {
                key: "user:stu_1".to_string()
            }
            .is_retryable()
        );
        assert!(!AchievementError::Validation("描述不能为空".to_string()).is_retryable());
        assert!(
            !AchievementError::Persistence(StoreError::InvalidKey("a/b".to_string()))
                .is_retryable()
        );
    }

    #[test]
    fn test_error_is_business_error() {
        assert!(AchievementError::UserNotFound("u".to_string()).is_business_error());
        assert!(
            AchievementError::InvalidState {
                achievement_id: "a1".to_string(),
                current_status: AchievementStatus::Approved,
            }
            .is_business_error()
        );
        assert!(!AchievementError::Internal("panic".to_string()).is_business_error());
    }

    #[test]
    fn test_error_code_and_display() {
        let err = AchievementError::InvalidState {
            achievement_id: "ach_1".to_string(),
            current_status: AchievementStatus::Rejected,
        };
        assert_eq!(err.error_code(), "INVALID_STATE");
        assert!(err.to_string().contains("ach_1"));
        assert!(err.to_string().contains("rejected"));

        let err = AchievementError::AchievementNotFound {
            user_id: "stu_123".to_string(),
            achievement_id: "missing".to_string(),
        };
        assert_eq!(err.error_code(), "ACHIEVEMENT_NOT_FOUND");
        assert!(err.to_string().contains("stu_123"));
    }
}
