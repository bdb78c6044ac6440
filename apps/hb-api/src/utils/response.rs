//! HTTP 响应辅助函数
//!
//! - plain_text：纯文本响应（ping 接口）
//! - json_line：JSON 加换行（poll 接口）
//! - storage_status：存储错误到状态码的映射
//! - new_token：生成随机 token

use api_contract::ApiResponse;
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hb_storage::StorageError;
use rand_core::{OsRng, RngCore};
use serde::Serialize;
use tracing::error;

/// 新 token 的随机字节数。
pub const TOKEN_BYTES: usize = 16;

pub fn plain_text(status: StatusCode, body: String) -> Response {
    (status, body).into_response()
}

/// 序列化为 JSON 并追加换行。
pub fn json_line<T: Serialize>(status: StatusCode, value: &T) -> Response {
    match serde_json::to_string(value) {
        Ok(mut body) => {
            body.push('\n');
            let mut response = (status, body).into_response();
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            response
        }
        Err(err) => {
            error!(target: "hb.api", error = %err, "response_encode_failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("INTERNAL.ERROR", err.to_string())),
            )
                .into_response()
        }
    }
}

/// 暂时性错误（连接池饱和）返回 503，其余存储错误为 500。
pub fn storage_status(err: &StorageError) -> StatusCode {
    if err.is_transient() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// 16 字节随机数的标准 base64 编码。
pub fn new_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tokens_are_random_base64() {
        let first = new_token();
        let second = new_token();
        assert_eq!(first.len(), 24);
        assert_ne!(first, second);
        assert_eq!(STANDARD.decode(&first).expect("decode").len(), TOKEN_BYTES);
    }

    #[test]
    fn saturation_maps_to_service_unavailable() {
        assert_eq!(
            storage_status(&StorageError::Saturated),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            storage_status(&StorageError::new("boom")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
