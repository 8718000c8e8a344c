//! HTTP 查询后端：RetryPolicy 包裹 ResilientFetcher
//!
//! 每次尝试 = 发请求 + 状态检查 + 解码；其中任何一步失败都算本次尝试失败并
//! 进入下一次重试（策略对错误类别不加区分，上游 5xx 同样重试）。

use async_trait::async_trait;

use crate::backend::{
    ensure_success, FetchError, QueryBackend, QueryRequest, QueryResponse, ResilientFetcher,
    RetriesExhausted, RetryPolicy,
};

/// HTTP 后端：POST {base_url}/query
pub struct HttpBackend {
    fetcher: ResilientFetcher,
    retry: RetryPolicy,
    query_url: String,
    timeout_millis: Option<u64>,
}

impl HttpBackend {
    pub fn new(base_url: &str, retry: RetryPolicy, timeout_millis: Option<u64>) -> Self {
        Self {
            fetcher: ResilientFetcher::new(),
            retry,
            query_url: format!("{}/query", base_url.trim_end_matches('/')),
            timeout_millis,
        }
    }

    async fn attempt(&self, request: &QueryRequest) -> Result<QueryResponse, FetchError> {
        let response = self
            .fetcher
            .fetch(&self.query_url, request, self.timeout_millis)
            .await?;
        let response = ensure_success(response).await?;
        response
            .json::<QueryResponse>()
            .await
            .map_err(FetchError::from_reqwest)
    }
}

#[async_trait]
impl QueryBackend for HttpBackend {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, RetriesExhausted> {
        tracing::info!(query = %request.query, url = %self.query_url, "dispatching query");
        self.retry.execute(|_attempt| self.attempt(request)).await
    }
}
