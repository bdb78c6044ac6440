//! 内存缓存实现（用于测试与本地演示）。
//!
//! 多个 `InMemoryHandle` 共享同一个 `InMemoryCache`，行为与真实缓存一致：
//! key 按 TTL 过期，读取不续期。`set_online(false)` 模拟后端不可达。

use crate::error::StorageError;
use crate::traits::CacheHandle;
use domain::{Clock, SystemClock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

struct Entry {
    value: Vec<u8>,
    expires_at: i64,
}

pub struct InMemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
    online: AtomicBool,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
            online: AtomicBool::new(true),
        }
    }

    /// 创建一个绑定到本缓存的句柄。
    pub fn handle(self: &Arc<Self>) -> InMemoryHandle {
        InMemoryHandle {
            cache: Arc::clone(self),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// 未过期的 key 数量。
    pub fn len(&self) -> usize {
        let now = self.clock.now_unix();
        self.entries
            .read()
            .map(|map| map.values().filter(|entry| entry.expires_at > now).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_online(&self) -> Result<(), StorageError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::new("cache backend unreachable"))
        }
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

pub struct InMemoryHandle {
    cache: Arc<InMemoryCache>,
}

#[async_trait::async_trait]
impl CacheHandle for InMemoryHandle {
    async fn set(&mut self, key: &str, value: &[u8], ttl: Duration) -> Result<(), StorageError> {
        self.cache.ensure_online()?;
        let expires_at = self.cache.clock.now_unix() + ttl.as_secs().max(1) as i64;
        let mut map = self
            .cache
            .entries
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        map.insert(
            key.to_string(),
            Entry {
                value: value.to_vec(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.cache.ensure_online()?;
        let now = self.cache.clock.now_unix();
        let map = self
            .cache
            .entries
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(map
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.clone()))
    }

    async fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        self.cache.ensure_online()?;
        let mut map = self
            .cache
            .entries
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        map.remove(key);
        Ok(())
    }
}
