//! 提交错误分类
//!
//! 与编排器配合：空输入与容量问题在触网前拦下，配额耗尽区别于网络失败单独上报，
//! 派发失败携带重试耗尽的根因。除存储写入外，任何失败路径都不改动配额与会话树。

use thiserror::Error;

use crate::backend::RetriesExhausted;
use crate::session::TreeError;

/// 一次提交（或重新生成）可能的失败
#[derive(Error, Debug)]
pub enum QueryError {
    /// 空白输入：无网络调用、不耗配额
    #[error("Query is empty")]
    EmptyQuery,

    /// 当日配额用尽；只能等外部重置，UI 以阻断对话框呈现
    #[error("Daily query quota exhausted")]
    QuotaExhausted,

    /// 追问容量已满；UI 应已禁用入口，走到这里意味着调用方有 bug
    #[error("Follow-up capacity reached for result {0}")]
    CapacityExceeded(usize),

    /// 目标根结果不存在
    #[error("No result at index {0}")]
    NotFound(usize),

    /// 重试耗尽后的派发失败；本次提交终止，可由用户重试
    #[error("Dispatch failed: {0}")]
    DispatchFailed(#[from] RetriesExhausted),

    /// 配额持久化失败（结果已入树，剩余值未落盘）
    #[error("Quota storage error: {0}")]
    Storage(#[source] anyhow::Error),
}

impl From<TreeError> for QueryError {
    fn from(e: TreeError) -> Self {
        match e {
            TreeError::NotFound(index) => QueryError::NotFound(index),
            TreeError::CapacityExceeded { root, .. } => QueryError::CapacityExceeded(root),
        }
    }
}
