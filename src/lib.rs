//! Copilot - 会计 Copilot 查询核心
//!
//! 模块划分：
//! - **answer**: 答案大纲解析（编号分段 + 首冒号切分标题/正文）
//! - **backend**: 查询后端抽象与实现（HTTP / Mock）、弹性请求与重试
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 查询编排器与错误分类
//! - **observability**: tracing 初始化
//! - **proxy**: 本地转发代理（feature = "proxy"）
//! - **session**: 会话树（根问题 + 追问）与每日配额

pub mod answer;
pub mod backend;
pub mod config;
pub mod core;
pub mod observability;
#[cfg(feature = "proxy")]
pub mod proxy;
pub mod session;
