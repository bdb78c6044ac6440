//! # Heartbeat Storage 模块
//!
//! 心跳注册表的存储层：固定容量的缓存连接池、启动期端点发现、
//! 记录编解码以及在其上构建的在线状态存储。
//!
//! ## 架构设计
//!
//! ```text
//! HTTP handlers
//!       │
//!       ▼
//! PresenceStore (register_ping / check_ping / status)
//!       │
//!       ▼
//! ConnectionPool<H> ── acquire（带超时）/ release（guard drop）
//!       │
//!       ▼
//! CacheHandle ── RedisHandle（一致性哈希 + 多节点）/ InMemoryHandle
//! ```
//!
//! ## 模块说明
//!
//! - [`pool`]：固定容量连接池，超时返回 `StorageError::Saturated`
//! - [`discovery`]：`config get cluster` 端点发现，失败回退静态节点列表
//! - [`codec`]：主键 base64 编码、记录 JSON 编解码
//! - [`presence`]：心跳登记、查询与存活探测
//! - [`redis`]：Redis 句柄（RESP、按节点多路复用连接、超时与重试窗口）
//! - [`ring`]：ketama 风格一致性哈希环
//! - [`in_memory`]：内存缓存实现（测试与本地演示）
//! - [`connection`]：根据配置构建 Redis 连接池
//!
//! ## 设计约束
//!
//! - 连接池容量在构造时确定，运行期不扩缩容
//! - 连接池从不重试，重试由调用方决定
//! - 记录不存在是正常结果，使用独立的 `NotFound` 变体
//! - 日志只输出编码后的 key，不输出原始主键

pub mod codec;
pub mod connection;
pub mod discovery;
pub mod error;
pub mod in_memory;
pub mod pool;
pub mod presence;
pub mod redis;
pub mod ring;
pub mod traits;

pub use codec::*;
pub use connection::*;
pub use discovery::*;
pub use error::*;
pub use in_memory::{InMemoryCache, InMemoryHandle};
pub use pool::{ConnectionPool, PooledHandle};
pub use presence::{PresenceStore, RECORD_TTL, STATUS_KEY_PREFIX, status_key};
pub use self::redis::RedisHandle;
pub use ring::HashRing;
pub use traits::*;
