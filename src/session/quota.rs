//! 每日提问配额
//!
//! 进程内计数 + 外部键值存储：启动时从存储初始化（无记录则取配额上限），
//! 每次成功提交后写穿回存储（不缓冲），会话内只减不增。
//! 预留/提交两段式：`try_reserve` 在派发前检查，拿到凭证后网络成功才 `commit`，
//! 失败时丢弃凭证即可（预留本身不改任何状态）。

use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// 剩余配额的键值存储；配额值由 QuotaTracker 独占写入
pub trait QuotaStore: Send {
    /// 读取持久化的剩余值；无记录时返回 None
    fn load(&self) -> anyhow::Result<Option<u32>>;

    /// 写入剩余值（整数按字符串存储）
    fn save(&self, remaining: u32) -> anyhow::Result<()>;
}

/// 单文件存储：文件全文即十进制字符串，父目录不存在时自动创建
#[derive(Debug)]
pub struct FileQuotaStore {
    path: PathBuf,
}

impl FileQuotaStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl QuotaStore for FileQuotaStore {
    fn load(&self) -> anyhow::Result<Option<u32>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&self.path)?;
        let value = data.trim().parse::<u32>()?;
        Ok(Some(value))
    }

    fn save(&self, remaining: u32) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, remaining.to_string())?;
        Ok(())
    }
}

/// 内存存储（测试用）
#[derive(Debug, Default)]
pub struct InMemoryQuotaStore {
    value: Mutex<Option<u32>>,
}

impl InMemoryQuotaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: u32) -> Self {
        Self {
            value: Mutex::new(Some(value)),
        }
    }
}

impl QuotaStore for InMemoryQuotaStore {
    fn load(&self) -> anyhow::Result<Option<u32>> {
        Ok(*self.value.lock().unwrap())
    }

    fn save(&self, remaining: u32) -> anyhow::Result<()> {
        *self.value.lock().unwrap() = Some(remaining);
        Ok(())
    }
}

/// 配额预留凭证：只能 commit 一次；丢弃即放弃预留，无任何状态变化
#[derive(Debug)]
#[must_use = "a reservation that is never committed does not consume quota"]
pub struct Reservation {
    _priv: (),
}

/// 剩余提问数追踪器：内存值与存储写穿保持一致
pub struct QuotaTracker {
    queries_left: u32,
    store: Box<dyn QuotaStore>,
}

impl QuotaTracker {
    /// 从存储初始化；读不到记录（或读取失败）时取 max_queries
    pub fn load(store: Box<dyn QuotaStore>, max_queries: u32) -> Self {
        let queries_left = match store.load() {
            Ok(Some(v)) => v,
            Ok(None) => max_queries,
            Err(e) => {
                tracing::warn!("quota storage read failed ({}), starting from ceiling", e);
                max_queries
            }
        };
        Self {
            queries_left,
            store,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.queries_left
    }

    /// 还有余量时返回提交凭证；为 0 时返回 None 且不产生任何副作用
    pub fn try_reserve(&self) -> Option<Reservation> {
        if self.queries_left > 0 {
            Some(Reservation { _priv: () })
        } else {
            None
        }
    }

    /// 消耗凭证：减 1 并立即持久化
    pub fn commit(&mut self, _reservation: Reservation) -> anyhow::Result<()> {
        self.queries_left = self.queries_left.saturating_sub(1);
        self.store.save(self.queries_left)?;
        Ok(())
    }
}
