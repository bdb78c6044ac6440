//! 设备心跳 HTTP 服务
//!
//! 路由：
//! - `/{major}/ping/`、`/{major}/ping/:token`：登记心跳
//! - `/{major}/poll/`：批量查询距上次心跳的秒数
//! - `/status`：后端存活探测
//! - `/metrics`：计数器与连接池快照

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod shutdown;
pub mod utils;

use hb_storage::HeartbeatStore;
use std::sync::Arc;

pub use routes::{api_prefix, create_router};
pub use shutdown::shutdown_signal;

/// 服务版本（`/status` 返回）。
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn HeartbeatStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn HeartbeatStore>) -> Self {
        Self { store }
    }
}
