//! 应用运行配置加载。
//!
//! 所有数值/时长配置均以字符串读取并在启动时解析；
//! 解析失败时记录告警并回退到默认值，不会中断启动。

use std::env;
use std::time::Duration;
use tracing::warn;

/// 配置解析错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
    #[error("invalid duration: {0}")]
    InvalidDuration(String),
}

/// 缓存句柄的单次操作超时（均为可选）。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandleTimeouts {
    pub send: Option<Duration>,
    pub recv: Option<Duration>,
    pub poll: Option<Duration>,
    pub retry: Option<Duration>,
}

/// 记录生命周期配置（已解析但未应用，记录 TTL 固定为 15 分钟）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlConfig {
    pub registration: Duration,
    pub live: Duration,
    pub delete: Duration,
}

/// 分片配置（预留，未参与 key 派生）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardConfig {
    pub default_host: String,
    pub current_host: String,
    pub prefix: String,
}

/// 存储层配置。
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub cache_servers: Vec<String>,
    pub pool_size: usize,
    pub handle_timeout: Duration,
    pub handle_timeouts: HandleTimeouts,
    pub discovery_endpoint: Option<String>,
    pub discovery_timeout: Duration,
    pub ttl: TtlConfig,
    pub shard: ShardConfig,
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    pub storage: StorageConfig,
}

pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_CACHE_SERVER: &str = "127.0.0.1:6379";
pub const DEFAULT_POOL_SIZE: usize = 100;
pub const DEFAULT_HANDLE_TIMEOUT: Duration = Duration::from_secs(5);
/// `HB_DB_HANDLE_TIMEOUT` 无法解析时使用的回退值。
pub const FALLBACK_HANDLE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(2);

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意 key 查询函数读取配置（测试中用 HashMap 代替进程环境）。
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let http_addr =
            read_optional(&lookup, "HB_HTTP_ADDR").unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string());
        Self {
            http_addr,
            storage: StorageConfig::from_lookup(&lookup),
        }
    }
}

impl StorageConfig {
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let cache_servers = split_servers(
            &read_optional(lookup, "HB_CACHE_SERVERS")
                .unwrap_or_else(|| DEFAULT_CACHE_SERVER.to_string()),
        );
        let cache_servers = if cache_servers.is_empty() {
            vec![DEFAULT_CACHE_SERVER.to_string()]
        } else {
            cache_servers
        };

        let pool_size = match read_usize_with_default(lookup, "HB_CACHE_POOL_SIZE", DEFAULT_POOL_SIZE)
        {
            0 => {
                warn!(key = "HB_CACHE_POOL_SIZE", default = DEFAULT_POOL_SIZE, "pool_size_invalid");
                DEFAULT_POOL_SIZE
            }
            value => value,
        };

        let handle_timeout = match read_optional(lookup, "HB_DB_HANDLE_TIMEOUT") {
            None => DEFAULT_HANDLE_TIMEOUT,
            Some(value) => parse_duration(&value).unwrap_or_else(|err| {
                warn!(key = "HB_DB_HANDLE_TIMEOUT", error = %err, "config_parse_failed");
                FALLBACK_HANDLE_TIMEOUT
            }),
        };

        let handle_timeouts = HandleTimeouts {
            send: read_optional_duration(lookup, "HB_CACHE_SEND_TIMEOUT"),
            recv: read_optional_duration(lookup, "HB_CACHE_RECV_TIMEOUT"),
            poll: read_optional_duration(lookup, "HB_CACHE_POLL_TIMEOUT"),
            retry: read_optional_duration(lookup, "HB_CACHE_RETRY_TIMEOUT"),
        };

        let discovery_endpoint = read_optional(lookup, "HB_DISCOVERY_ENDPOINT");
        let discovery_timeout = read_optional_duration(lookup, "HB_DISCOVERY_TIMEOUT")
            .unwrap_or(DEFAULT_DISCOVERY_TIMEOUT);

        let ttl = TtlConfig {
            registration: Duration::from_secs(read_u64_with_default(
                lookup,
                "HB_DB_TIMEOUT_REG",
                10_800,
            )),
            live: Duration::from_secs(read_u64_with_default(lookup, "HB_DB_TIMEOUT_LIVE", 259_200)),
            delete: Duration::from_secs(read_u64_with_default(
                lookup,
                "HB_DB_TIMEOUT_DEL",
                86_400,
            )),
        };

        let default_host = read_optional(lookup, "HB_SHARD_DEFAULT_HOST")
            .unwrap_or_else(|| "localhost".to_string());
        let current_host =
            read_optional(lookup, "HB_SHARD_CURRENT_HOST").unwrap_or_else(|| default_host.clone());
        let prefix = read_optional(lookup, "HB_SHARD_PREFIX").unwrap_or_else(|| "_h-".to_string());

        Self {
            cache_servers,
            pool_size,
            handle_timeout,
            handle_timeouts,
            discovery_endpoint,
            discovery_timeout,
            ttl,
            shard: ShardConfig {
                default_host,
                current_host,
                prefix,
            },
        }
    }
}

/// 拆分逗号分隔的节点列表，剔除所有空白字符。
pub fn split_servers(value: &str) -> Vec<String> {
    let compact: String = value
        .chars()
        .filter(|c| !matches!(c, ' ' | '\x08'..='\x0d'))
        .collect();
    compact
        .split(',')
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// 解析时长字符串。
///
/// 支持 `ns`/`us`/`ms`/`s`/`m`/`h` 后缀及其组合（如 `1m30s`、`1.5s`），
/// 不带单位的整数按秒处理。
pub fn parse_duration(value: &str) -> Result<Duration, ConfigError> {
    let text = value.trim();
    let invalid = || ConfigError::InvalidDuration(value.to_string());
    if text.is_empty() {
        return Err(invalid());
    }
    if let Ok(seconds) = text.parse::<u64>() {
        return Ok(Duration::from_secs(seconds));
    }

    let mut total = Duration::ZERO;
    let mut rest = text;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(invalid());
        }
        let number: f64 = rest[..number_len].parse().map_err(|_| invalid())?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let nanos_per_unit = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3_600e9,
            _ => return Err(invalid()),
        };
        rest = &rest[unit_len..];
        total += Duration::from_nanos((number * nanos_per_unit).round() as u64);
    }
    Ok(total)
}

fn read_optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => None,
    }
}

fn read_optional_duration<F>(lookup: &F, key: &str) -> Option<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let value = read_optional(lookup, key)?;
    match parse_duration(&value) {
        Ok(duration) => Some(duration),
        Err(err) => {
            warn!(key, error = %err, "config_parse_failed");
            None
        }
    }
}

fn read_u64_with_default<F>(lookup: &F, key: &str, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = read_optional(lookup, key) else {
        return default;
    };
    value.parse::<u64>().unwrap_or_else(|_| {
        let err = ConfigError::Invalid(key.to_string(), value);
        warn!(key, error = %err, default, "config_parse_failed");
        default
    })
}

fn read_usize_with_default<F>(lookup: &F, key: &str, default: usize) -> usize
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = read_optional(lookup, key) else {
        return default;
    };
    value.parse::<usize>().unwrap_or_else(|_| {
        let err = ConfigError::Invalid(key.to_string(), value);
        warn!(key, error = %err, default, "config_parse_failed");
        default
    })
}
