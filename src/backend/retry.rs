//! 重试策略：固定间隔的顺序重试
//!
//! 尝试严格串行，失败后等待固定间隔再试（固定值而非自适应退避）。
//! 对错误类别不加区分：任何一次失败都触发下一次尝试，直到次数用尽。
//! 中间失败只记日志，最后一次的错误包进 RetriesExhausted 上抛。

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::backend::FetchError;

/// 所有尝试均告失败；携带最后一次尝试的错误
#[derive(Error, Debug)]
#[error("All {attempts} attempts failed: {last}")]
pub struct RetriesExhausted {
    pub attempts: u32,
    #[source]
    pub last: FetchError,
}

/// 固定次数 + 固定间隔的重试；参数来自配置而非常量
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// 顺序执行 op（收到当前尝试序号，从 1 起）直到成功或次数用尽
    pub async fn execute<T, F, Fut>(&self, mut op: F) -> Result<T, RetriesExhausted>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_attempts => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "attempt failed, retrying after delay"
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    return Err(RetriesExhausted {
                        attempts: self.max_attempts,
                        last: err,
                    });
                }
            }
        }
    }
}
