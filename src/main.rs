//! Copilot - 会计 Copilot 查询核心
//!
//! 入口：初始化日志与配置，启动行式 REPL。直接输入即提问；
//! /follow <序号> <问题> 追问；/regen <序号> 重新生成；/quota 查看余量；/quit 退出。

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};

use copilot::answer::parse_sections;
use copilot::config::load_config;
use copilot::core::{QueryError, QueryOrchestrator};
use copilot::observability;
use copilot::session::SearchResult;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        Default::default()
    });
    let mut orchestrator = QueryOrchestrator::from_config(&cfg);

    println!(
        "Copilot ready. {} queries left today.",
        orchestrator.queries_left()
    );
    println!("Ask a question, or: /follow <n> <question>, /regen <n>, /quota, /quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("stdin read failed")? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" {
            break;
        }
        if line == "/quota" {
            println!("{} queries left today.", orchestrator.queries_left());
            continue;
        }

        let outcome = if let Some(rest) = line.strip_prefix("/regen ") {
            match rest.trim().parse::<usize>() {
                Ok(index) => orchestrator.regenerate(index).await,
                Err(_) => {
                    println!("Usage: /regen <result number>");
                    continue;
                }
            }
        } else if let Some(rest) = line.strip_prefix("/follow ") {
            let mut parts = rest.trim().splitn(2, ' ');
            match (
                parts.next().and_then(|s| s.parse::<usize>().ok()),
                parts.next(),
            ) {
                (Some(index), Some(question)) => orchestrator.submit(question, Some(index)).await,
                _ => {
                    println!("Usage: /follow <result number> <question>");
                    continue;
                }
            }
        } else if line.starts_with('/') {
            println!("Unknown command: {}", line);
            continue;
        } else {
            let submitted = orchestrator.submit(&line, None).await;
            if submitted.is_ok() {
                println!("Result #{}", orchestrator.results().len() - 1);
            }
            submitted
        };

        match outcome {
            Ok(result) => {
                render(&result);
                println!("({} queries left)", orchestrator.queries_left());
            }
            Err(QueryError::QuotaExhausted) => {
                println!(
                    "You've reached the maximum number of queries for today. \
                     Please come back tomorrow or upgrade your plan."
                );
            }
            Err(e) => println!("Query failed: {}", e),
        }
    }

    Ok(())
}

/// 打印一条结果：大纲分节 + 来源片段
fn render(result: &SearchResult) {
    println!("Q: {}", result.query);
    for (i, section) in parse_sections(&result.answer).iter().enumerate() {
        println!("{}. {}", i + 1, section.heading);
        if !section.body.trim().is_empty() {
            println!("   {}", section.body.trim());
        }
    }
    if !result.excerpts.is_empty() {
        println!("Sources:");
        for excerpt in &result.excerpts {
            println!("- {} ({})", excerpt.content, excerpt.reference);
        }
    }
}
