//! 追踪、请求 ID 生成与基础计数器。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 计数器快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub pings_registered: u64,
    pub ping_failures: u64,
    pub polls: u64,
    pub poll_hits: u64,
    pub poll_misses: u64,
    pub poll_failures: u64,
    pub pool_saturated: u64,
}

/// 进程级计数器。
pub struct TelemetryMetrics {
    pings_registered: AtomicU64,
    ping_failures: AtomicU64,
    polls: AtomicU64,
    poll_hits: AtomicU64,
    poll_misses: AtomicU64,
    poll_failures: AtomicU64,
    pool_saturated: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            pings_registered: AtomicU64::new(0),
            ping_failures: AtomicU64::new(0),
            polls: AtomicU64::new(0),
            poll_hits: AtomicU64::new(0),
            poll_misses: AtomicU64::new(0),
            poll_failures: AtomicU64::new(0),
            pool_saturated: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            pings_registered: self.pings_registered.load(Ordering::Relaxed),
            ping_failures: self.ping_failures.load(Ordering::Relaxed),
            polls: self.polls.load(Ordering::Relaxed),
            poll_hits: self.poll_hits.load(Ordering::Relaxed),
            poll_misses: self.poll_misses.load(Ordering::Relaxed),
            poll_failures: self.poll_failures.load(Ordering::Relaxed),
            pool_saturated: self.pool_saturated.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局计数器实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录心跳注册成功次数。
pub fn record_ping_registered() {
    metrics().pings_registered.fetch_add(1, Ordering::Relaxed);
}

/// 记录心跳注册失败次数。
pub fn record_ping_failure() {
    metrics().ping_failures.fetch_add(1, Ordering::Relaxed);
}

/// 记录轮询请求次数。
pub fn record_poll() {
    metrics().polls.fetch_add(1, Ordering::Relaxed);
}

/// 记录轮询命中的 token 数。
pub fn record_poll_hit() {
    metrics().poll_hits.fetch_add(1, Ordering::Relaxed);
}

/// 记录轮询未找到的 token 数。
pub fn record_poll_miss() {
    metrics().poll_misses.fetch_add(1, Ordering::Relaxed);
}

/// 记录轮询中存储失败的 token 数（不含未找到）。
pub fn record_poll_failure() {
    metrics().poll_failures.fetch_add(1, Ordering::Relaxed);
}

/// 记录连接池饱和次数。
pub fn record_pool_saturated() {
    metrics().pool_saturated.fetch_add(1, Ordering::Relaxed);
}
