//! 心跳登记 handlers
//!
//! - GET|POST|PUT /{major}/ping/
//! - GET|POST|PUT /{major}/ping/{token}

use crate::AppState;
use crate::utils::response::{new_token, plain_text, storage_status};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use hb_telemetry::{record_ping_failure, record_ping_registered};
use tracing::warn;

/// 路径中 token 的最大字符数。
pub const MAX_TOKEN_CHARS: usize = 16;

/// 未携带 token：生成新 token 后登记。
pub async fn register_new_ping(State(state): State<AppState>) -> Response {
    register(&state, new_token()).await
}

pub async fn register_ping(State(state): State<AppState>, Path(token): Path<String>) -> Response {
    let token = truncate_token(&token);
    if token.is_empty() {
        return register(&state, new_token()).await;
    }
    register(&state, token).await
}

async fn register(state: &AppState, token: String) -> Response {
    match state.store.register_ping(token.as_bytes()).await {
        Ok(()) => {
            record_ping_registered();
            plain_text(StatusCode::OK, format!("{token}\n"))
        }
        Err(err) => {
            record_ping_failure();
            warn!(target: "hb.api", error = %err, "ping_register_failed");
            plain_text(
                storage_status(&err),
                format!("Could not register token {token}"),
            )
        }
    }
}

/// 按字符截断，保证不会切断多字节字符。
pub fn truncate_token(token: &str) -> String {
    token.chars().take(MAX_TOKEN_CHARS).collect()
}
