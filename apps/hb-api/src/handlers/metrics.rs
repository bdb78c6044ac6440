//! Telemetry 指标快照。
//!
//! - GET /metrics

use crate::AppState;
use api_contract::{ApiResponse, MetricsSnapshotDto};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hb_telemetry::metrics;

pub async fn get_metrics(State(state): State<AppState>) -> Response {
    let snapshot = metrics().snapshot();
    let pool = state.store.pool_stats();
    (
        StatusCode::OK,
        Json(ApiResponse::success(MetricsSnapshotDto {
            pings_registered: snapshot.pings_registered,
            ping_failures: snapshot.ping_failures,
            polls: snapshot.polls,
            poll_hits: snapshot.poll_hits,
            poll_misses: snapshot.poll_misses,
            poll_failures: snapshot.poll_failures,
            pool_saturated: snapshot.pool_saturated,
            pool_capacity: pool.capacity,
            pool_available: pool.available,
            pool_outstanding: pool.outstanding,
        })),
    )
        .into_response()
}
