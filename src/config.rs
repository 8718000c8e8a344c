//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `COPILOT__*` 覆盖（双下划线表示嵌套，
//! 如 `COPILOT__BACKEND__BASE_URL=https://...`）。
//! 超时、重试次数、重试间隔与配额上限均为配置项而非常量。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendSection,
    #[serde(default)]
    pub quota: QuotaSection,
    #[serde(default)]
    pub proxy: ProxySection,
}

/// [backend] 段：查询端点与弹性参数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendSection {
    /// 查询后端根地址（不含 /query 路径）；未设置时使用 Mock 后端
    pub base_url: Option<String>,
    /// 每次检索返回的片段数
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    /// 单次请求超时（毫秒）；0 表示不设截止时间
    #[serde(default = "default_timeout_millis")]
    pub timeout_millis: u64,
    /// 单次提交的最大尝试次数
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// 两次尝试之间的固定等待（毫秒）
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_top_k() -> u32 {
    5
}

fn default_timeout_millis() -> u64 {
    30_000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1_000
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            base_url: None,
            top_k: default_top_k(),
            timeout_millis: default_timeout_millis(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// [quota] 段：每日提问配额与持久化位置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuotaSection {
    /// 配额上限（存储中无记录时的初始值）
    #[serde(default = "default_max_queries")]
    pub max_queries: u32,
    /// 剩余配额的存储文件，未设置时用 workspace/queries_left
    pub storage_path: Option<PathBuf>,
}

fn default_max_queries() -> u32 {
    20
}

impl Default for QuotaSection {
    fn default() -> Self {
        Self {
            max_queries: default_max_queries(),
            storage_path: None,
        }
    }
}

/// [proxy] 段：本地转发代理（copilot-proxy）
#[derive(Debug, Clone, Deserialize)]
pub struct ProxySection {
    #[serde(default = "default_proxy_port")]
    pub port: u16,
}

impl Default for ProxySection {
    fn default() -> Self {
        Self {
            port: default_proxy_port(),
        }
    }
}

fn default_proxy_port() -> u16 {
    8080
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendSection::default(),
            quota: QuotaSection::default(),
            proxy: ProxySection::default(),
        }
    }
}

impl QuotaSection {
    /// 剩余配额的实际存储路径（缺省 workspace/queries_left）
    pub fn storage_path(&self) -> PathBuf {
        self.storage_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("workspace/queries_left"))
    }
}

/// 从 config 目录加载配置，环境变量 COPILOT__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 COPILOT__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("COPILOT")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
