//! 固定容量的缓存句柄连接池
//!
//! 句柄在构造时一次性放入，之后容量不再变化（不支持运行期扩缩容）。
//! 获取句柄受信号量约束并带超时；超时返回 `StorageError::Saturated`，
//! 作为背压信号交给调用方处理，连接池自身不重试。
//!
//! 不变量：池内空闲句柄数 + 已借出句柄数 == 容量。

use crate::error::StorageError;
use crate::traits::PoolStats;
use hb_telemetry::record_pool_saturated;
use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::error;

pub struct ConnectionPool<H: Send> {
    slots: Mutex<VecDeque<H>>,
    permits: Semaphore,
    capacity: usize,
    acquire_timeout: Duration,
    outstanding: AtomicUsize,
}

impl<H: Send> ConnectionPool<H> {
    /// 用已构建的句柄建立连接池，容量即句柄数量。
    pub fn new(handles: Vec<H>, acquire_timeout: Duration) -> Self {
        let capacity = handles.len();
        Self {
            slots: Mutex::new(handles.into_iter().collect()),
            permits: Semaphore::new(capacity),
            capacity,
            acquire_timeout,
            outstanding: AtomicUsize::new(0),
        }
    }

    /// 借出一个句柄。
    ///
    /// 等待时间不超过 `acquire_timeout`，等待者按先来先得排队。
    /// 返回的 `PooledHandle` 在 `release` 或 drop 时归还句柄。
    pub async fn acquire(&self) -> Result<PooledHandle<'_, H>, StorageError> {
        let permit = match tokio::time::timeout(self.acquire_timeout, self.permits.acquire()).await
        {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) | Err(_) => {
                record_pool_saturated();
                error!(
                    target: "hb.storage",
                    capacity = self.capacity,
                    outstanding = self.outstanding(),
                    timeout_ms = self.acquire_timeout.as_millis() as u64,
                    "pool_saturated"
                );
                return Err(StorageError::Saturated);
            }
        };

        let Some(handle) = self.lock_slots().pop_front() else {
            // 许可与句柄一一对应，走到这里说明不变量被破坏；许可随 drop 归还。
            error!(target: "hb.storage", "pool_slot_missing");
            return Err(StorageError::Saturated);
        };
        permit.forget();
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        Ok(PooledHandle {
            pool: self,
            handle: Some(handle),
        })
    }

    /// 无条件归还句柄（不做健康检查），空句柄直接忽略。
    fn release(&self, handle: Option<H>) {
        let Some(handle) = handle else {
            return;
        };
        self.lock_slots().push_back(handle);
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
        self.permits.add_permits(1);
    }

    fn lock_slots(&self) -> MutexGuard<'_, VecDeque<H>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 当前可立即借出的句柄数。
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// 当前已借出未归还的句柄数。
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            capacity: self.capacity,
            available: self.available(),
            outstanding: self.outstanding(),
        }
    }
}

/// 借出中的句柄，生命周期内独占。
pub struct PooledHandle<'a, H: Send> {
    pool: &'a ConnectionPool<H>,
    handle: Option<H>,
}

impl<H: Send> PooledHandle<'_, H> {
    /// 显式归还句柄；不调用时 drop 也会归还。
    pub fn release(mut self) {
        self.pool.release(self.handle.take());
    }
}

impl<H: Send> Deref for PooledHandle<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        match &self.handle {
            Some(handle) => handle,
            None => unreachable!("pooled handle used after release"),
        }
    }
}

impl<H: Send> DerefMut for PooledHandle<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        match &mut self.handle {
            Some(handle) => handle,
            None => unreachable!("pooled handle used after release"),
        }
    }
}

impl<H: Send> Drop for PooledHandle<'_, H> {
    fn drop(&mut self) {
        self.pool.release(self.handle.take());
    }
}
