//! 存活探测 handler
//!
//! - GET /status

use crate::{AppState, VERSION};
use api_contract::StatusResponse;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::warn;

pub async fn status(State(state): State<AppState>) -> Response {
    match state.store.status().await {
        // 不健康总是以 Err 返回
        Ok(_) => (StatusCode::OK, Json(StatusResponse::ok(VERSION))).into_response(),
        Err(err) => {
            warn!(target: "hb.api", error = %err, "status_unhealthy");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(StatusResponse::unhealthy(VERSION, err.to_string())),
            )
                .into_response()
        }
    }
}
