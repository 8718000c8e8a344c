//! Mock 查询后端（测试与未配置后端时的本地回退）
//!
//! 将提问回显成一段编号大纲，并记录被调用的次数，便于断言「配额耗尽时不再触网」。

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::backend::{FetchError, QueryBackend, QueryRequest, QueryResponse, RetriesExhausted};
use crate::session::Excerpt;

/// Mock 后端：回显提问；`failing()` 构造的实例恒定失败
#[derive(Debug, Default)]
pub struct MockBackend {
    calls: AtomicUsize,
    fail: bool,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 恒定失败的实例，用于失败路径测试
    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    /// 至今被调用的次数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryBackend for MockBackend {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, RetriesExhausted> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RetriesExhausted {
                attempts: 1,
                last: FetchError::Network("mock backend failure".to_string()),
            });
        }
        Ok(QueryResponse {
            answer: format!("1. Echo: {}", request.query),
            excerpts: vec![Excerpt {
                content: format!("Mock excerpt for: {}", request.query),
                reference: "mock".to_string(),
            }],
        })
    }
}
