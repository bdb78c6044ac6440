use hb_config::{AppConfig, StorageConfig};
use hb_storage::{StorageError, resolve_endpoints, resolve_servers};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

/// 启动一个只应答一次的假配置端点。
async fn fake_config_endpoint(reply: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr").to_string();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);
        let mut command = String::new();
        reader.read_line(&mut command).await.expect("read");
        assert_eq!(command, "config get cluster\r\n");
        writer.write_all(reply.as_bytes()).await.expect("write");
    });
    addr
}

fn storage_config(discovery_endpoint: Option<String>) -> StorageConfig {
    let mut config = AppConfig::from_lookup(|_| None).storage;
    config.cache_servers = vec!["static:6379".to_string()];
    config.discovery_endpoint = discovery_endpoint;
    config.discovery_timeout = Duration::from_millis(300);
    config
}

#[tokio::test]
async fn resolves_node_list() {
    let addr = fake_config_endpoint(
        "CONFIG cluster 0 60\r\n12\r\nc1|10.0.0.1|6379 c2|10.0.0.2|6379\n\r\nEND\r\n",
    )
    .await;
    let endpoints = resolve_endpoints(&addr, Duration::from_secs(1))
        .await
        .expect("resolve");
    assert_eq!(endpoints, "10.0.0.1:6379,10.0.0.2:6379");
}

#[tokio::test]
async fn truncated_reply_is_empty_not_error() {
    let addr = fake_config_endpoint("CONFIG cluster 0 60\r\n").await;
    let endpoints = resolve_endpoints(&addr, Duration::from_secs(1))
        .await
        .expect("resolve");
    assert!(endpoints.is_empty());
}

#[tokio::test]
async fn silent_endpoint_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr").to_string();
    let _keep = tokio::spawn(async move {
        let (_stream, _) = listener.accept().await.expect("accept");
        tokio::time::sleep(Duration::from_secs(5)).await;
    });
    let err = resolve_endpoints(&addr, Duration::from_millis(200))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::DiscoveryTimeout(_)));
}

#[tokio::test]
async fn servers_fall_back_when_discovery_fails() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr").to_string();
    drop(listener);
    let servers = resolve_servers(&storage_config(Some(addr))).await;
    assert_eq!(servers, vec!["static:6379".to_string()]);
}

#[tokio::test]
async fn servers_fall_back_when_discovery_is_empty() {
    let addr = fake_config_endpoint("CONFIG cluster 0 4\r\n1\r\ngarbage\r\nEND\r\n").await;
    let servers = resolve_servers(&storage_config(Some(addr))).await;
    assert_eq!(servers, vec!["static:6379".to_string()]);
}

#[tokio::test]
async fn servers_use_discovery_result() {
    let addr = fake_config_endpoint("CONFIG cluster 0 20\r\n3\r\nc1|cache-a|6380\r\nEND\r\n").await;
    let servers = resolve_servers(&storage_config(Some(addr))).await;
    assert_eq!(servers, vec!["cache-a:6380".to_string()]);
}

#[tokio::test]
async fn servers_default_to_static_list() {
    let servers = resolve_servers(&storage_config(None)).await;
    assert_eq!(servers, vec!["static:6379".to_string()]);
}
