//! 请求上下文中间件
//!
//! request_context：确定 request_id/trace_id，写入请求扩展、日志 span
//! 与响应头（x-request-id / x-trace-id），请求结束时记录状态码与耗时。
//! 调用方已携带 x-request-id 时沿用该值，便于跨服务串联日志。

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use hb_telemetry::{RequestIds, new_request_ids};
use std::time::Instant;
use tracing::{Instrument, info, info_span};

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// 外部传入的 request_id 最大长度，超出则重新生成。
const MAX_INBOUND_ID_LEN: usize = 128;

pub async fn request_context(mut req: Request<Body>, next: Next) -> Response {
    let ids = resolve_ids(req.headers());
    let span = info_span!(
        "request",
        request_id = %ids.request_id,
        trace_id = %ids.trace_id,
        method = %req.method(),
        path = %req.uri().path(),
    );
    req.extensions_mut().insert(ids.clone());

    let started = Instant::now();
    let mut response = next.run(req).instrument(span.clone()).await;
    span.in_scope(|| {
        info!(
            target: "hb.api",
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request_completed"
        );
    });

    let headers = response.headers_mut();
    for (name, value) in [
        (REQUEST_ID_HEADER, &ids.request_id),
        (TRACE_ID_HEADER, &ids.trace_id),
    ] {
        if let Ok(value) = HeaderValue::from_str(value) {
            headers.insert(name, value);
        }
    }
    response
}

/// 沿用合法的入站 request_id，trace_id 总是新生成。
fn resolve_ids(headers: &HeaderMap) -> RequestIds {
    let mut ids = new_request_ids();
    let inbound = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty() && value.len() <= MAX_INBOUND_ID_LEN);
    if let Some(request_id) = inbound {
        ids.request_id = request_id.to_string();
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_request_id_is_kept() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("lb-42"));
        let ids = resolve_ids(&headers);
        assert_eq!(ids.request_id, "lb-42");
        assert_ne!(ids.trace_id, "lb-42");
    }

    #[test]
    fn missing_or_oversized_id_is_generated() {
        let generated = resolve_ids(&HeaderMap::new());
        assert!(!generated.request_id.is_empty());

        let mut headers = HeaderMap::new();
        let long = "x".repeat(MAX_INBOUND_ID_LEN + 1);
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(&long).expect("header"));
        assert_ne!(resolve_ids(&headers).request_id, long);
    }
}
