//! 查询编排器
//!
//! 负责一次提交的完整流程：输入校验 -> 追问容量预检 -> 配额预留 -> 经重试策略
//! 派发 -> 结果入树 -> 配额提交。配额只在结果成功入树后扣减；失败的派发
//! 不入树、不计费。

use std::sync::Arc;
use std::time::Duration;

use crate::backend::{HttpBackend, MockBackend, QueryBackend, QueryRequest, RetryPolicy};
use crate::config::AppConfig;
use crate::core::QueryError;
use crate::session::{ConversationTree, FileQuotaStore, QuotaTracker, SearchResult};

/// 每个根结果最多挂的追问数
pub const MAX_FOLLOW_UPS: usize = 5;

/// 根据配置选择后端：有 base_url 走 HTTP，否则回退 Mock
pub(crate) fn create_backend_from_config(cfg: &AppConfig) -> Arc<dyn QueryBackend> {
    match cfg
        .backend
        .base_url
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    {
        Some(base_url) => {
            let retry = RetryPolicy::new(
                cfg.backend.max_attempts,
                Duration::from_millis(cfg.backend.retry_delay_ms),
            );
            let timeout = (cfg.backend.timeout_millis > 0).then_some(cfg.backend.timeout_millis);
            tracing::info!("Using HTTP backend ({})", base_url);
            Arc::new(HttpBackend::new(base_url, retry, timeout))
        }
        None => {
            tracing::warn!("No backend base_url configured, using Mock backend");
            Arc::new(MockBackend::new())
        }
    }
}

/// 编排器：组合配额、后端与会话树；一个实例同一时刻只跑一次派发（&mut 方法）
pub struct QueryOrchestrator {
    backend: Arc<dyn QueryBackend>,
    quota: QuotaTracker,
    tree: ConversationTree,
    top_k: u32,
}

impl QueryOrchestrator {
    pub fn new(backend: Arc<dyn QueryBackend>, quota: QuotaTracker, top_k: u32) -> Self {
        Self {
            backend,
            quota,
            tree: ConversationTree::new(MAX_FOLLOW_UPS),
            top_k,
        }
    }

    /// 按配置组装：后端选择 + 文件配额存储
    pub fn from_config(cfg: &AppConfig) -> Self {
        let backend = create_backend_from_config(cfg);
        let store = FileQuotaStore::new(cfg.quota.storage_path());
        let quota = QuotaTracker::load(Box::new(store), cfg.quota.max_queries);
        Self::new(backend, quota, cfg.backend.top_k)
    }

    /// 提交提问；parent_index 为 Some 时作为该根下的追问（同 query 原位覆盖）
    pub async fn submit(
        &mut self,
        query_text: &str,
        parent_index: Option<usize>,
    ) -> Result<SearchResult, QueryError> {
        let query = query_text.trim();
        if query.is_empty() {
            return Err(QueryError::EmptyQuery);
        }
        if let Some(parent) = parent_index {
            self.tree.can_add_follow_up(parent, query)?;
        }
        let reservation = self
            .quota
            .try_reserve()
            .ok_or(QueryError::QuotaExhausted)?;

        // 派发失败时 reservation 随 ? 丢弃，配额与树均保持原状
        let request = QueryRequest::new(query, self.top_k);
        let response = self.backend.query(&request).await?;

        let result = SearchResult::new(query, response.answer, response.excerpts);
        match parent_index {
            Some(parent) => {
                let (index, inserted) = self.tree.upsert_follow_up(parent, result.clone())?;
                tracing::info!(parent, index, inserted, "follow-up stored");
            }
            None => {
                let index = self.tree.append_root(result.clone());
                tracing::info!(index, "root result stored");
            }
        }
        self.quota.commit(reservation).map_err(QueryError::Storage)?;

        Ok(result)
    }

    /// 用原提问重新生成 index 处的根结果；整体替换，原有追问丢弃，照常耗 1 配额
    pub async fn regenerate(&mut self, index: usize) -> Result<SearchResult, QueryError> {
        let query = self
            .tree
            .get(index)
            .ok_or(QueryError::NotFound(index))?
            .query
            .clone();
        let reservation = self
            .quota
            .try_reserve()
            .ok_or(QueryError::QuotaExhausted)?;

        let request = QueryRequest::regenerate(&query, self.top_k);
        let response = self.backend.query(&request).await?;

        let result = SearchResult::new(query, response.answer, response.excerpts);
        self.tree.replace_root(index, result.clone())?;
        self.quota.commit(reservation).map_err(QueryError::Storage)?;
        tracing::info!(index, "root result regenerated");

        Ok(result)
    }

    pub fn results(&self) -> &[SearchResult] {
        self.tree.roots()
    }

    pub fn queries_left(&self) -> u32 {
        self.quota.remaining()
    }

    /// UI 侧预检：该根还能否再挂一条指定提问的追问
    pub fn can_add_follow_up(&self, root_index: usize, query: &str) -> bool {
        self.tree.can_add_follow_up(root_index, query).is_ok()
    }
}
