//! 存储层错误类型
//!
//! 键值存储与证书文件存储共用的错误定义。业务层将其包装为持久化错误向上传播。

use thiserror::Error;

/// 存储错误类型
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("存储 I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("存储后端不可用: {backend} - {message}")]
    Unavailable { backend: String, message: String },

    #[error("证书文件不存在: {reference}")]
    BlobNotFound { reference: String },

    #[error("非法的存储键: {0}")]
    InvalidKey(String),

    #[error("上传内容无效: {0}")]
    InvalidUpload(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 存储结果类型别名
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "STORE_IO_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Unavailable { .. } => "STORE_UNAVAILABLE",
            Self::BlobNotFound { .. } => "BLOB_NOT_FOUND",
            Self::InvalidKey(_) => "INVALID_KEY",
            Self::InvalidUpload(_) => "INVALID_UPLOAD",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 是否为可重试错误
    ///
    /// 只有 I/O 抖动和后端暂时不可用属于瞬时故障
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Unavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = StoreError::BlobNotFound {
            reference: "blob:sha256:abc".to_string(),
        };
        assert_eq!(err.code(), "BLOB_NOT_FOUND");
        assert!(err.to_string().contains("blob:sha256:abc"));
    }

    #[test]
    fn test_is_retryable() {
        let io = StoreError::Io(std::io::Error::other("disk busy"));
        assert!(io.is_retryable());

        let unavailable = StoreError::Unavailable {
            backend: "file".to_string(),
            message: "locked".to_string(),
        };
        assert!(unavailable.is_retryable());

        assert!(!StoreError::InvalidKey("../x".to_string()).is_retryable());
        assert!(!StoreError::Internal("boom".to_string()).is_retryable());
    }
}
