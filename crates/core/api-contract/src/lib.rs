//! 稳定的 DTO 与 API 响应契约。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// 健康检查状态值。
pub const STATUS_OK: &str = "OK";
pub const STATUS_ERROR: &str = "ERROR";

/// 健康检查响应体：`{"status":"OK","version":"0.1.0"}`。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl StatusResponse {
    pub fn ok(version: impl Into<String>) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            version: version.into(),
            error: None,
        }
    }

    pub fn unhealthy(version: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            version: version.into(),
            error: Some(error.into()),
        }
    }
}

/// 轮询结果：token -> 距上次心跳秒数。未找到的 token 不出现。
pub type PollResult = BTreeMap<String, i64>;

/// 指标快照 DTO。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
    pub pings_registered: u64,
    pub ping_failures: u64,
    pub polls: u64,
    pub poll_hits: u64,
    pub poll_misses: u64,
    pub poll_failures: u64,
    pub pool_saturated: u64,
    pub pool_capacity: usize,
    pub pool_available: usize,
    pub pool_outstanding: usize,
}
