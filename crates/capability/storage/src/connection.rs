//! 缓存连接池初始化
//!
//! 提供 connect_pool：确定节点列表（端点发现或静态配置），
//! 并一次性构建 `pool_size` 个 Redis 句柄。

use crate::discovery::resolve_servers;
use crate::pool::ConnectionPool;
use crate::redis::RedisHandle;
use futures::future::join_all;
use hb_config::StorageConfig;
use tracing::info;

/// 建立 Redis 句柄连接池
///
/// 句柄并发构建；个别节点不可达只记录日志，句柄仍然入池。
pub async fn connect_pool(config: &StorageConfig) -> ConnectionPool<RedisHandle> {
    let servers = resolve_servers(config).await;
    info!(
        target: "hb.storage",
        servers = %servers.join(","),
        pool_size = config.pool_size,
        "creating cache handles"
    );
    let handles = join_all(
        (0..config.pool_size).map(|_| RedisHandle::connect(&servers, config.handle_timeouts)),
    )
    .await;
    ConnectionPool::new(handles, config.handle_timeout)
}
