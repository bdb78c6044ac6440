//! 路由定义
//!
//! 心跳接口挂在版本前缀下（取 crate 主版本号，如 `/0`），
//! 状态与指标接口不带前缀。poll 请求体在 handler 内按上限截断读取。

use super::AppState;
use super::handlers::*;
use super::middleware::request_context;
use axum::{
    Router,
    middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// 版本前缀，例如 `/0`。
pub fn api_prefix() -> String {
    format!("/{}", env!("CARGO_PKG_VERSION_MAJOR"))
}

/// 创建完整路由（含请求上下文中间件）
pub fn create_router(state: AppState) -> Router {
    let prefix = api_prefix();
    Router::new()
        .route(
            &format!("{prefix}/ping/"),
            get(register_new_ping)
                .post(register_new_ping)
                .put(register_new_ping),
        )
        .route(
            &format!("{prefix}/ping/:token"),
            get(register_ping).post(register_ping).put(register_ping),
        )
        .route(&format!("{prefix}/poll/"), post(poll))
        .route("/status", get(status))
        .route("/status/", get(status))
        .route("/metrics", get(get_metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // 注入 request_id/trace_id
        .layer(middleware::from_fn(request_context))
}
