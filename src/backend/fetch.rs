//! 弹性请求：带截止时间的单次 HTTP 调用
//!
//! 截止时间是调用级参数而非 Client 级配置：`timeout_millis` 为 None 时直接转发，
//! 否则用计时器与网络操作赛跑。计时器先到即取消在途请求并报 Timeout；
//! 无论哪条路径结束，计时器随本次调用一并撤销，不会跨调用遗留。

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// 单次请求的失败类别；超时与其它传输失败分开，便于调用方做不同的状态码映射
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Response decode failed: {0}")]
    Decode(String),

    #[error("Upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },
}

impl FetchError {
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

/// 弹性请求器：持有不带内置超时的 Client，截止时间逐调用显式传入
#[derive(Clone, Debug, Default)]
pub struct ResilientFetcher {
    client: reqwest::Client,
}

impl ResilientFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 发送 POST JSON 请求
    ///
    /// `timeout_millis` 为 None 时不设截止时间；为 Some 时计时器先到则本次调用
    /// 以 Timeout 失败，未完成的请求 future 随之丢弃（在途调用被取消）。
    pub async fn fetch<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        timeout_millis: Option<u64>,
    ) -> Result<reqwest::Response, FetchError> {
        let request = self.client.post(url).json(body).send();
        match timeout_millis {
            None => request.await.map_err(FetchError::from_reqwest),
            Some(ms) => match tokio::time::timeout(Duration::from_millis(ms), request).await {
                Ok(outcome) => outcome.map_err(FetchError::from_reqwest),
                Err(_elapsed) => Err(FetchError::Timeout(ms)),
            },
        }
    }
}

/// 非 2xx 响应读出正文并折叠为 Upstream 错误；2xx 原样返回
pub async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(FetchError::Upstream {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// 单次应答的最小 HTTP 服务器，返回其根地址
    async fn spawn_one_shot(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });
        format!("http://{}", addr)
    }

    /// 接受连接后永不应答的服务器
    async fn spawn_hanging() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _held = listener.accept().await;
            std::future::pending::<()>().await;
        });
        format!("http://{}", addr)
    }

    const OK_RESPONSE: &str =
        "HTTP/1.1 200 OK\r\ncontent-type: text/plain\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok";

    #[tokio::test]
    async fn test_fetch_without_deadline() {
        let url = spawn_one_shot(OK_RESPONSE).await;
        let fetcher = ResilientFetcher::new();
        let response = fetcher
            .fetch(&url, &serde_json::json!({"query": "q"}), None)
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
    }

    #[tokio::test]
    async fn test_fetch_completes_before_deadline() {
        let url = spawn_one_shot(OK_RESPONSE).await;
        let fetcher = ResilientFetcher::new();
        let response = fetcher
            .fetch(&url, &serde_json::json!({"query": "q"}), Some(5_000))
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
    }

    #[tokio::test]
    async fn test_never_responding_upstream_times_out() {
        let url = spawn_hanging().await;
        let fetcher = ResilientFetcher::new();

        let started = Instant::now();
        let err = fetcher
            .fetch(&url, &serde_json::json!({"query": "q"}), Some(100))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Timeout(100)));
        // 在 timeout + ε 内返回，而不是挂死
        assert!(started.elapsed() < Duration::from_millis(1_000));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // 绑定后立刻释放端口，拿一个当前无人监听的地址
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = ResilientFetcher::new();
        let err = fetcher
            .fetch(
                &format!("http://{}", addr),
                &serde_json::json!({"query": "q"}),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }

    #[tokio::test]
    async fn test_ensure_success_wraps_non_2xx() {
        let url = spawn_one_shot(
            "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 5\r\nconnection: close\r\n\r\nboom!",
        )
        .await;
        let fetcher = ResilientFetcher::new();
        let response = fetcher
            .fetch(&url, &serde_json::json!({"query": "q"}), None)
            .await
            .unwrap();

        match ensure_success(response).await.unwrap_err() {
            FetchError::Upstream { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom!");
            }
            other => panic!("Expected Upstream, got {:?}", other),
        }
    }
}
