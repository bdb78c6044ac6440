//! 存储层错误类型
//!
//! 区分以下几类错误：
//! - 连接池饱和（可重试的背压信号）
//! - 记录不存在（正常结果，调用方视为“从未出现”）
//! - 端点发现超时/失败（启动期，回退到静态节点列表）
//! - 编解码与后端命令错误

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("connection pool saturated")]
    Saturated,
    #[error("record not found")]
    NotFound,
    #[error("invalid primary key")]
    InvalidKey,
    #[error("endpoint discovery timed out after {0:?}")]
    DiscoveryTimeout(Duration),
    #[error("endpoint discovery failed: {0}")]
    Discovery(String),
    #[error("codec error: {0}")]
    Codec(String),
    #[error("backend error: {0}")]
    Backend(String),
    #[error("unhealthy: {0}")]
    Unhealthy(String),
}

impl StorageError {
    /// 构造后端错误。
    pub fn new(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// 是否为可稍后重试的暂时性错误。
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Saturated)
    }
}

impl From<redis::RedisError> for StorageError {
    fn from(err: redis::RedisError) -> Self {
        Self::new(err.to_string())
    }
}
