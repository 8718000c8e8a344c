//! 查询后端抽象
//!
//! 所有后端（HTTP / Mock）实现 QueryBackend：一次检索-问答调用。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::backend::RetriesExhausted;
use crate::session::Excerpt;

/// 发往后端 /query 端点的请求体
#[derive(Clone, Debug, Serialize)]
pub struct QueryRequest {
    pub query: String,
    pub top_k: u32,
    /// 仅重新生成时带上；常规提问不序列化该键
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regenerate: Option<bool>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>, top_k: u32) -> Self {
        Self {
            query: query.into(),
            top_k,
            regenerate: None,
        }
    }

    pub fn regenerate(query: impl Into<String>, top_k: u32) -> Self {
        Self {
            query: query.into(),
            top_k,
            regenerate: Some(true),
        }
    }
}

/// 后端响应：答案文本与来源片段；excerpts 缺失时按空处理
#[derive(Clone, Debug, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    #[serde(default)]
    pub excerpts: Vec<Excerpt>,
}

/// 查询后端 trait：派发一次查询，失败即重试耗尽
#[async_trait]
pub trait QueryBackend: Send + Sync {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, RetriesExhausted>;
}
