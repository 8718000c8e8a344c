//! 答案大纲解析
//!
//! 后端返回的 answer 是编号、冒号分隔的大纲文本（"1. 标题: 正文 2. 标题: 正文 ..."）。
//! 按 "<编号>. " 标记分段、丢弃空段，每段再按第一个冒号切成标题/正文；
//! 只切首个冒号，正文里出现冒号不会被截断。段尾由编号标记引入的空白会被去掉。

use regex::Regex;
use serde::Serialize;

/// 大纲中的一节：标题与正文（正文保留冒号后的原样空白）
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnswerSection {
    pub heading: String,
    pub body: String,
}

/// 将原始答案文本解析为大纲节列表；无编号标记时整体作为单节
pub fn parse_sections(answer: &str) -> Vec<AnswerSection> {
    let marker = match Regex::new(r"\d+\.\s") {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };

    marker
        .split(answer)
        .map(str::trim_end)
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.split_once(':') {
            Some((heading, body)) => AnswerSection {
                heading: heading.to_string(),
                body: body.to_string(),
            },
            None => AnswerSection {
                heading: segment.to_string(),
                body: String::new(),
            },
        })
        .collect()
}
