//! Redis 缓存句柄
//!
//! 一个句柄绑定全部缓存节点：key 经一致性哈希环路由到节点，
//! 每个节点持有一条独立的多路复用连接（RESP 协议，二进制安全）。
//!
//! 超时配置：
//! - poll：建立连接的上限
//! - send + recv：单次命令的上限（都未配置时为 10 秒）
//! - retry：节点失败后在该时长内直接判定不可用，到期后重连

use crate::error::StorageError;
use crate::ring::HashRing;
use crate::traits::CacheHandle;
use hb_config::HandleTimeouts;
use redis::aio::MultiplexedConnection;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, warn};

/// 未配置超时时的单次操作上限。
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(10);

struct NodeSlot {
    addr: String,
    client: Option<redis::Client>,
    connection: Option<MultiplexedConnection>,
    retry_after: Option<Instant>,
}

impl NodeSlot {
    fn open(addr: &str) -> Self {
        let client = match redis::Client::open(node_url(addr)) {
            Ok(client) => Some(client),
            Err(err) => {
                error!(target: "hb.storage", node = %addr, error = %err, "cache_node_invalid");
                None
            }
        };
        Self {
            addr: addr.to_string(),
            client,
            connection: None,
            retry_after: None,
        }
    }

    async fn connection(
        &mut self,
        connect_timeout: Duration,
    ) -> Result<&mut MultiplexedConnection, StorageError> {
        if let Some(until) = self.retry_after {
            if Instant::now() < until {
                return Err(StorageError::new(format!(
                    "cache node {} unavailable",
                    self.addr
                )));
            }
            self.retry_after = None;
        }

        if self.connection.is_none() {
            let client = self.client.as_ref().ok_or_else(|| {
                StorageError::new(format!("invalid cache node address {}", self.addr))
            })?;
            let connection =
                match tokio::time::timeout(connect_timeout, client.get_multiplexed_tokio_connection())
                    .await
                {
                    Ok(Ok(connection)) => connection,
                    Ok(Err(err)) => {
                        return Err(StorageError::new(format!(
                            "connect to {} failed: {err}",
                            self.addr
                        )));
                    }
                    Err(_) => {
                        return Err(StorageError::new(format!(
                            "connect to {} timed out",
                            self.addr
                        )));
                    }
                };
            self.connection = Some(connection);
        }

        self.connection
            .as_mut()
            .ok_or_else(|| StorageError::new(format!("cache node {} not connected", self.addr)))
    }

    fn mark_failed(&mut self, retry: Option<Duration>) {
        self.connection = None;
        self.retry_after = retry.map(|delay| Instant::now() + delay);
    }
}

/// 节点地址转为 Redis URL，已带 scheme 的原样使用。
fn node_url(addr: &str) -> String {
    if addr.contains("://") {
        addr.to_string()
    } else {
        format!("redis://{addr}/")
    }
}

pub struct RedisHandle {
    nodes: Vec<NodeSlot>,
    ring: HashRing,
    timeouts: HandleTimeouts,
}

impl RedisHandle {
    /// 构建句柄并尝试连接所有节点。
    ///
    /// 连接失败只记录日志，不影响句柄创建；首次使用时会重新连接，
    /// 届时错误才返回给调用方。
    pub async fn connect(servers: &[String], timeouts: HandleTimeouts) -> Self {
        let mut handle = Self {
            nodes: servers.iter().map(|addr| NodeSlot::open(addr)).collect(),
            ring: HashRing::new(servers),
            timeouts,
        };
        let connect_timeout = handle.connect_timeout();
        for node in &mut handle.nodes {
            if let Err(err) = node.connection(connect_timeout).await {
                warn!(target: "hb.storage", node = %node.addr, error = %err, "cache_node_unreachable");
            }
        }
        handle
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn connect_timeout(&self) -> Duration {
        self.timeouts.poll.unwrap_or(DEFAULT_OPERATION_TIMEOUT)
    }

    fn command_timeout(&self) -> Duration {
        match (self.timeouts.send, self.timeouts.recv) {
            (Some(send), Some(recv)) => send + recv,
            (Some(limit), None) | (None, Some(limit)) => limit,
            (None, None) => DEFAULT_OPERATION_TIMEOUT,
        }
    }

    async fn run<T>(&mut self, key: &str, command: redis::Cmd) -> Result<T, StorageError>
    where
        T: redis::FromRedisValue,
    {
        let connect_timeout = self.connect_timeout();
        let command_timeout = self.command_timeout();
        let retry = self.timeouts.retry;
        let index = self
            .ring
            .node_for(key)
            .ok_or_else(|| StorageError::new("no cache nodes configured"))?;
        let node = &mut self.nodes[index];

        let connection = match node.connection(connect_timeout).await {
            Ok(connection) => connection,
            Err(err) => {
                node.mark_failed(retry);
                return Err(err);
            }
        };
        let outcome =
            tokio::time::timeout(command_timeout, command.query_async::<_, T>(connection)).await;
        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                if err.is_io_error() || err.is_connection_dropped() || err.is_timeout() {
                    node.mark_failed(retry);
                }
                Err(StorageError::from(err))
            }
            Err(_) => {
                node.mark_failed(retry);
                Err(StorageError::new(format!(
                    "command on {} timed out after {command_timeout:?}",
                    node.addr
                )))
            }
        }
    }
}

#[async_trait::async_trait]
impl CacheHandle for RedisHandle {
    async fn set(&mut self, key: &str, value: &[u8], ttl: Duration) -> Result<(), StorageError> {
        let mut command = redis::cmd("SET");
        command.arg(key).arg(value).arg("EX").arg(ttl.as_secs().max(1));
        self.run::<()>(key, command).await
    }

    async fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let mut command = redis::cmd("GET");
        command.arg(key);
        self.run::<Option<Vec<u8>>>(key, command).await
    }

    async fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        let mut command = redis::cmd("DEL");
        command.arg(key);
        self.run::<()>(key, command).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_url_adds_scheme() {
        assert_eq!(node_url("10.0.0.1:6379"), "redis://10.0.0.1:6379/");
        assert_eq!(node_url("redis://cache:6380/1"), "redis://cache:6380/1");
    }

    #[tokio::test]
    async fn unreachable_node_surfaces_error_on_use() {
        let timeouts = HandleTimeouts {
            poll: Some(Duration::from_millis(200)),
            recv: Some(Duration::from_millis(200)),
            ..HandleTimeouts::default()
        };
        let mut handle = RedisHandle::connect(&["127.0.0.1:1".to_string()], timeouts).await;
        assert_eq!(handle.node_count(), 1);
        let result = handle.get("a2V5").await;
        assert!(matches!(result, Err(StorageError::Backend(_))));
    }

    #[tokio::test]
    async fn handle_without_nodes_fails() {
        let mut handle = RedisHandle::connect(&[], HandleTimeouts::default()).await;
        assert!(handle.delete("a2V5").await.is_err());
    }
}
