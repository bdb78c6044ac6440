//! 批量查询 handler
//!
//! - POST /{major}/poll/
//!
//! 请求体为逗号分隔的 token 列表，只读取前 10 MiB，超出部分丢弃；
//! 查询失败（含未找到）的 token 不出现在结果中。

use crate::AppState;
use crate::utils::response::{json_line, plain_text};
use api_contract::PollResult;
use axum::{
    body::Body,
    extract::State,
    http::StatusCode,
    response::Response,
};
use futures::StreamExt;
use hb_telemetry::{record_poll, record_poll_failure, record_poll_hit, record_poll_miss};
use tracing::{debug, warn};

/// poll 请求体读取上限（10 MiB）。
pub const MAX_POLL_BODY_BYTES: usize = 10 * 1024 * 1024;

pub async fn poll(State(state): State<AppState>, body: Body) -> Response {
    record_poll();
    let body = match read_capped(body, MAX_POLL_BODY_BYTES).await {
        Ok(body) => body,
        Err(err) => {
            warn!(target: "hb.api", error = %err, "poll_body_read_failed");
            return plain_text(StatusCode::BAD_REQUEST, "Could not read request body".to_string());
        }
    };
    let body = String::from_utf8_lossy(&body);
    let mut result = PollResult::new();
    for token in parse_tokens(&body) {
        match state.store.check_ping(token.as_bytes()).await {
            Ok(seconds) => {
                record_poll_hit();
                result.insert(token.to_string(), seconds);
            }
            Err(err) if err.is_not_found() => record_poll_miss(),
            Err(err) => {
                record_poll_failure();
                warn!(target: "hb.api", error = %err, "poll_lookup_failed");
            }
        }
    }
    json_line(StatusCode::OK, &result)
}

/// 读取请求体的前 `limit` 字节，其余部分不再读取。
pub async fn read_capped(body: Body, limit: usize) -> Result<Vec<u8>, axum::Error> {
    let mut stream = body.into_data_stream();
    let mut buffer = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let room = limit - buffer.len();
        if chunk.len() >= room {
            buffer.extend_from_slice(&chunk[..room]);
            if chunk.len() > room {
                debug!(target: "hb.api", limit, "poll_body_truncated");
            }
            break;
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer)
}

/// 逗号切分并去除首尾空白，跳过空 token。
pub fn parse_tokens(body: &str) -> impl Iterator<Item = &str> {
    body.split(',').map(str::trim).filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{parse_tokens, read_capped};
    use axum::body::Body;

    #[test]
    fn tokens_are_trimmed_and_empties_skipped() {
        let tokens: Vec<&str> = parse_tokens(" abc123, missingKey,,\n xyz ,").collect();
        assert_eq!(tokens, vec!["abc123", "missingKey", "xyz"]);
    }

    #[test]
    fn blank_body_has_no_tokens() {
        assert_eq!(parse_tokens("  ").count(), 0);
    }

    #[tokio::test]
    async fn body_is_cut_at_limit() {
        let body = read_capped(Body::from("abc123,def456"), 8).await.expect("read");
        assert_eq!(body, b"abc123,d");
    }

    #[tokio::test]
    async fn short_body_is_read_whole() {
        let body = read_capped(Body::from("abc123"), 8).await.expect("read");
        assert_eq!(body, b"abc123");
    }
}
