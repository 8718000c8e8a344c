//! Copilot 本地转发代理
//!
//! 启动: cargo run --bin copilot-proxy --features proxy
//! 前端访问 http://127.0.0.1:8080/api/query

#![cfg(feature = "proxy")]

use std::sync::Arc;

use anyhow::Context;

use copilot::config::load_config;
use copilot::observability;
use copilot::proxy::{router, ProxyState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        Default::default()
    });

    let base_url = cfg
        .backend
        .base_url
        .clone()
        .context("backend.base_url is required to run the proxy")?;
    let timeout = (cfg.backend.timeout_millis > 0).then_some(cfg.backend.timeout_millis);
    let state = Arc::new(ProxyState::new(&base_url, timeout));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], cfg.proxy.port));
    tracing::info!("Copilot proxy: http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind proxy port")?;
    axum::serve(listener, router(state))
        .await
        .context("Proxy server failed")?;

    Ok(())
}
