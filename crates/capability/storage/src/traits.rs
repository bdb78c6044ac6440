//! 缓存句柄接口
//!
//! 连接池中的每个句柄都实现 `CacheHandle`。句柄由连接池独占持有，
//! 同一时刻只被一个操作借用，因此方法接收 `&mut self`。

use crate::error::StorageError;
use std::time::Duration;

#[async_trait::async_trait]
pub trait CacheHandle: Send {
    /// 写入 key，`ttl` 到期后由缓存侧淘汰。
    async fn set(&mut self, key: &str, value: &[u8], ttl: Duration) -> Result<(), StorageError>;

    /// 读取 key，不存在或已过期时返回 `None`。
    async fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    async fn delete(&mut self, key: &str) -> Result<(), StorageError>;
}

/// 连接池占用情况。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub capacity: usize,
    pub available: usize,
    pub outstanding: usize,
}

/// 心跳存储接口（HTTP 层通过 `Arc<dyn HeartbeatStore>` 使用）。
#[async_trait::async_trait]
pub trait HeartbeatStore: Send + Sync {
    async fn register_ping(&self, key: &[u8]) -> Result<(), StorageError>;

    /// 距上次心跳的秒数；记录不存在返回 `StorageError::NotFound`。
    async fn check_ping(&self, key: &[u8]) -> Result<i64, StorageError>;

    async fn status(&self) -> Result<bool, StorageError>;

    fn pool_stats(&self) -> PoolStats;
}
