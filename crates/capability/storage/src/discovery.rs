//! 缓存节点端点发现
//!
//! 向集群配置端点发送一条 `config get cluster` 命令，从应答中解析出
//! 当前存活的节点列表。应答格式：
//!
//! ```text
//! CONFIG cluster 0 <len>
//! <config version>
//! <id>|<host>|<port> <id>|<host>|<port> ...
//! END
//! ```
//!
//! 整个交互受超时约束；失败或超时时由调用方回退到静态配置的节点列表。

use crate::error::StorageError;
use hb_config::{StorageConfig, split_servers};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{error, info, warn};

const CLUSTER_CONFIG_COMMAND: &[u8] = b"config get cluster\r\n";

/// 查询集群配置端点，返回逗号分隔的 `host:port` 列表。
///
/// 超时返回 `StorageError::DiscoveryTimeout`；节点行无法读取时返回空字符串。
pub async fn resolve_endpoints(endpoint: &str, timeout: Duration) -> Result<String, StorageError> {
    match tokio::time::timeout(timeout, query_cluster_config(endpoint)).await {
        Ok(result) => result,
        Err(_) => Err(StorageError::DiscoveryTimeout(timeout)),
    }
}

async fn query_cluster_config(endpoint: &str) -> Result<String, StorageError> {
    let stream = TcpStream::connect(endpoint)
        .await
        .map_err(|err| StorageError::Discovery(format!("connect {endpoint}: {err}")))?;
    let (reader, mut writer) = stream.into_split();
    writer
        .write_all(CLUSTER_CONFIG_COMMAND)
        .await
        .map_err(|err| StorageError::Discovery(err.to_string()))?;
    writer
        .flush()
        .await
        .map_err(|err| StorageError::Discovery(err.to_string()))?;

    let mut reader = BufReader::new(reader);
    // 前两行是应答头与配置版本号。
    for _ in 0..2 {
        if read_line(&mut reader).await.is_none() {
            return Ok(String::new());
        }
    }
    let Some(line) = read_line(&mut reader).await else {
        return Ok(String::new());
    };
    Ok(parse_cluster_line(&line).join(","))
}

async fn read_line<R>(reader: &mut R) -> Option<String>
where
    R: AsyncBufReadExt + Unpin,
{
    let mut line = String::new();
    match reader.read_line(&mut line).await {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line),
    }
}

/// 解析节点行，跳过不足三段的条目。
pub fn parse_cluster_line(line: &str) -> Vec<String> {
    line.split_whitespace()
        .filter_map(|token| {
            let parts: Vec<&str> = token.split('|').collect();
            if parts.len() < 3 {
                return None;
            }
            Some(format!("{}:{}", parts[1], parts[2].trim()))
        })
        .collect()
}

/// 启动期确定缓存节点列表：优先端点发现，失败时回退到静态配置。
pub async fn resolve_servers(config: &StorageConfig) -> Vec<String> {
    let Some(endpoint) = config.discovery_endpoint.as_deref() else {
        return config.cache_servers.clone();
    };
    match resolve_endpoints(endpoint, config.discovery_timeout).await {
        Ok(list) => {
            let servers = split_servers(&list);
            if servers.is_empty() {
                warn!(target: "hb.storage", endpoint, "discovery_empty");
                return config.cache_servers.clone();
            }
            info!(target: "hb.storage", endpoint, servers = %list, "discovery_resolved");
            servers
        }
        Err(err) => {
            error!(target: "hb.storage", endpoint, error = %err, "discovery_failed");
            config.cache_servers.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_short_tokens() {
        let line = "cache-1|10.0.0.1|11211 broken|10.0.0.9 cache-2|10.0.0.2|11211\r\n";
        assert_eq!(
            parse_cluster_line(line),
            vec!["10.0.0.1:11211".to_string(), "10.0.0.2:11211".to_string()]
        );
    }

    #[test]
    fn parse_malformed_line_is_empty() {
        assert!(parse_cluster_line("garbage without pipes").is_empty());
        assert!(parse_cluster_line("").is_empty());
    }
}
