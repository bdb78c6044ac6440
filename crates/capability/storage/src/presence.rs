//! 在线状态存储
//!
//! - register_ping：写入 `last_seen = now`，记录 TTL 固定 15 分钟
//! - check_ping：返回距上次心跳的秒数，记录不存在返回 `StorageError::NotFound`
//! - status：哨兵 key 写入/读回/删除，任何故障（包括 panic）都转为错误结果；
//!   每次探测使用独立的哨兵 key，并发探测互不干扰
//!
//! 每个操作借用一个句柄，所有路径上都会归还。

use crate::codec::{decode_record, encode_key, encode_record};
use crate::error::StorageError;
use crate::pool::ConnectionPool;
use crate::traits::{CacheHandle, HeartbeatStore, PoolStats};
use domain::{Clock, PresenceRecord, SystemClock};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// 心跳记录 TTL。
///
/// 配置中的 `HB_DB_TIMEOUT_REG` 等生命周期参数不作用于此值。
pub const RECORD_TTL: Duration = Duration::from_secs(15 * 60);

/// 哨兵 key 前缀，后接每次探测独立的 uuid。
pub const STATUS_KEY_PREFIX: &str = "status__fake_id_";
const STATUS_VALUE: &[u8] = b"test";
const STATUS_TTL: Duration = Duration::from_secs(6);

pub struct PresenceStore<H: CacheHandle> {
    pool: ConnectionPool<H>,
    clock: Arc<dyn Clock>,
}

impl<H: CacheHandle> PresenceStore<H> {
    pub fn new(pool: ConnectionPool<H>) -> Self {
        Self::with_clock(pool, Arc::new(SystemClock))
    }

    pub fn with_clock(pool: ConnectionPool<H>, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    pub fn pool(&self) -> &ConnectionPool<H> {
        &self.pool
    }

    /// 登记一次心跳。失败会记录日志并原样返回，不自动重试。
    pub async fn register_ping(&self, key: &[u8]) -> Result<(), StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey);
        }
        let encoded_key = encode_key(key);
        let record = PresenceRecord::new(self.clock.now_unix());
        let data = encode_record(&record)?;

        let mut handle = self.pool.acquire().await?;
        let result = handle.set(&encoded_key, &data, RECORD_TTL).await;
        handle.release();

        match &result {
            Ok(()) => debug!(
                target: "hb.storage",
                key = %encoded_key,
                last_seen = record.last_seen,
                "ping_registered"
            ),
            Err(err) => error!(
                target: "hb.storage",
                op = "set",
                key = %encoded_key,
                error = %err,
                "cache_set_failed"
            ),
        }
        result
    }

    /// 查询距上次心跳的秒数。
    pub async fn check_ping(&self, key: &[u8]) -> Result<i64, StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey);
        }
        let encoded_key = encode_key(key);

        let mut handle = self.pool.acquire().await?;
        let fetched = handle.get(&encoded_key).await;
        handle.release();

        let data = match fetched {
            Ok(Some(data)) => data,
            Ok(None) => {
                debug!(target: "hb.storage", key = %encoded_key, "ping_not_found");
                return Err(StorageError::NotFound);
            }
            Err(err) => {
                error!(
                    target: "hb.storage",
                    op = "get",
                    key = %encoded_key,
                    error = %err,
                    "cache_get_failed"
                );
                return Err(err);
            }
        };
        let record = decode_record(&data).inspect_err(|err| {
            error!(
                target: "hb.storage",
                op = "decode",
                key = %encoded_key,
                error = %err,
                "record_decode_failed"
            );
        })?;
        Ok(record.seconds_since(self.clock.now_unix()))
    }

    /// 存活探测。`Ok(true)` 表示健康，其余情况均返回错误，不会向上传播 panic。
    pub async fn status(&self) -> Result<bool, StorageError> {
        match AssertUnwindSafe(self.probe()).catch_unwind().await {
            Ok(Ok(())) => Ok(true),
            Ok(Err(err)) => {
                warn!(target: "hb.storage", error = %err, "status_probe_failed");
                Err(err)
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(target: "hb.storage", error = %message, "status_probe_panicked");
                Err(StorageError::Unhealthy(message))
            }
        }
    }

    async fn probe(&self) -> Result<(), StorageError> {
        let key = status_key();
        let mut handle = self.pool.acquire().await?;
        handle.set(&key, STATUS_VALUE, STATUS_TTL).await?;
        let value = handle.get(&key).await?;
        if value.as_deref() != Some(STATUS_VALUE) {
            return Err(StorageError::Unhealthy("invalid value returned".to_string()));
        }
        if let Err(err) = handle.delete(&key).await {
            warn!(target: "hb.storage", op = "delete", error = %err, "status_cleanup_failed");
        }
        Ok(())
    }
}

pub fn status_key() -> String {
    format!("{STATUS_KEY_PREFIX}{}", uuid::Uuid::new_v4().simple())
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "status probe panicked".to_string()
    }
}

#[async_trait::async_trait]
impl<H: CacheHandle> HeartbeatStore for PresenceStore<H> {
    async fn register_ping(&self, key: &[u8]) -> Result<(), StorageError> {
        PresenceStore::register_ping(self, key).await
    }

    async fn check_ping(&self, key: &[u8]) -> Result<i64, StorageError> {
        PresenceStore::check_ping(self, key).await
    }

    async fn status(&self) -> Result<bool, StorageError> {
        PresenceStore::status(self).await
    }

    fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }
}
