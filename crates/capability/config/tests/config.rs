use hb_config::{AppConfig, DEFAULT_POOL_SIZE, FALLBACK_HANDLE_TIMEOUT};
use std::collections::HashMap;
use std::time::Duration;

fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    AppConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn defaults_when_unset() {
    let config = config_from(&[]);
    assert_eq!(config.http_addr, "127.0.0.1:8080");
    assert_eq!(config.storage.cache_servers, vec!["127.0.0.1:6379".to_string()]);
    assert_eq!(config.storage.pool_size, DEFAULT_POOL_SIZE);
    assert_eq!(config.storage.handle_timeout, Duration::from_secs(5));
    assert_eq!(config.storage.discovery_timeout, Duration::from_secs(2));
    assert!(config.storage.discovery_endpoint.is_none());
    assert!(config.storage.handle_timeouts.recv.is_none());
    assert_eq!(config.storage.ttl.registration, Duration::from_secs(10_800));
    assert_eq!(config.storage.ttl.live, Duration::from_secs(259_200));
    assert_eq!(config.storage.ttl.delete, Duration::from_secs(86_400));
    assert_eq!(config.storage.shard.default_host, "localhost");
    assert_eq!(config.storage.shard.current_host, "localhost");
    assert_eq!(config.storage.shard.prefix, "_h-");
}

#[test]
fn load_config_from_values() {
    let config = config_from(&[
        ("HB_HTTP_ADDR", "0.0.0.0:9000"),
        ("HB_CACHE_SERVERS", "10.0.0.1:6379, 10.0.0.2:6379"),
        ("HB_CACHE_POOL_SIZE", "8"),
        ("HB_DB_HANDLE_TIMEOUT", "250ms"),
        ("HB_CACHE_RECV_TIMEOUT", "2s"),
        ("HB_CACHE_RETRY_TIMEOUT", "1m"),
        ("HB_DISCOVERY_ENDPOINT", "cfg.cache.local:11211"),
        ("HB_SHARD_DEFAULT_HOST", "shard-a"),
    ]);
    assert_eq!(config.http_addr, "0.0.0.0:9000");
    assert_eq!(
        config.storage.cache_servers,
        vec!["10.0.0.1:6379".to_string(), "10.0.0.2:6379".to_string()]
    );
    assert_eq!(config.storage.pool_size, 8);
    assert_eq!(config.storage.handle_timeout, Duration::from_millis(250));
    assert_eq!(config.storage.handle_timeouts.recv, Some(Duration::from_secs(2)));
    assert_eq!(config.storage.handle_timeouts.retry, Some(Duration::from_secs(60)));
    assert_eq!(
        config.storage.discovery_endpoint.as_deref(),
        Some("cfg.cache.local:11211")
    );
    assert_eq!(config.storage.shard.current_host, "shard-a");
}

#[test]
fn unparsable_values_fall_back() {
    let config = config_from(&[
        ("HB_CACHE_POOL_SIZE", "lots"),
        ("HB_DB_HANDLE_TIMEOUT", "forever"),
        ("HB_CACHE_SEND_TIMEOUT", "quick"),
        ("HB_DB_TIMEOUT_REG", "-1"),
    ]);
    assert_eq!(config.storage.pool_size, DEFAULT_POOL_SIZE);
    assert_eq!(config.storage.handle_timeout, FALLBACK_HANDLE_TIMEOUT);
    assert!(config.storage.handle_timeouts.send.is_none());
    assert_eq!(config.storage.ttl.registration, Duration::from_secs(10_800));
}

#[test]
fn zero_pool_size_uses_default() {
    let config = config_from(&[("HB_CACHE_POOL_SIZE", "0")]);
    assert_eq!(config.storage.pool_size, DEFAULT_POOL_SIZE);
}
