//! 本地转发代理
//!
//! 前端不直连后端时走本机代理：POST /api/query 将请求体原样转发到后端 /query，
//! 按失败类别映射状态码：超时 504，网络失败 503，其余（含上游非 2xx）500，
//! 成功则透传 JSON。代理层单次转发，不做重试。

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;

use crate::backend::{ensure_success, FetchError, ResilientFetcher};

/// 代理状态：请求器 + 上游地址 + 逐请求超时
pub struct ProxyState {
    fetcher: ResilientFetcher,
    query_url: String,
    timeout_millis: Option<u64>,
}

impl ProxyState {
    pub fn new(base_url: &str, timeout_millis: Option<u64>) -> Self {
        Self {
            fetcher: ResilientFetcher::new(),
            query_url: format!("{}/query", base_url.trim_end_matches('/')),
            timeout_millis,
        }
    }
}

pub fn router(state: Arc<ProxyState>) -> Router {
    Router::new()
        .route("/api/query", post(api_query))
        .route("/api/health", get(|| async { "OK" }))
        .with_state(state)
}

/// POST /api/query：请求体透传；失败类别决定返回状态码
async fn api_query(
    State(state): State<Arc<ProxyState>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let response = state
        .fetcher
        .fetch(&state.query_url, &body, state.timeout_millis)
        .await
        .map_err(map_fetch_error)?;
    let response = ensure_success(response).await.map_err(map_fetch_error)?;

    response
        .json::<Value>()
        .await
        .map(Json)
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to decode backend response: {}", e),
            )
        })
}

fn map_fetch_error(e: FetchError) -> (StatusCode, String) {
    let status = match &e {
        FetchError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        FetchError::Network(_) => StatusCode::SERVICE_UNAVAILABLE,
        FetchError::Decode(_) | FetchError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::error!("proxy query failed: {}", e);
    (status, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        let (status, _) = map_fetch_error(FetchError::Timeout(30_000));
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);

        let (status, _) = map_fetch_error(FetchError::Network("refused".to_string()));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, _) = map_fetch_error(FetchError::Upstream {
            status: 404,
            body: "not found".to_string(),
        });
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
