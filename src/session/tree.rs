//! 会话树：根问题与追问
//!
//! 根结果按提交顺序排列、以下标寻址；每个根最多挂 max_follow_ups 条追问，
//! 同一根下追问的 query 唯一，重复提交时原位覆盖而非追加。
//! 所有变更同步完成，调用方不会观察到半更新状态。

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 来源片段：检索到的原文与出处
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Excerpt {
    pub content: String,
    pub reference: String,
}

/// 一次问答的完整结果；follow_ups 仅在根层级填充（类型允许递归，编排器只用一层）
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResult {
    pub query: String,
    pub answer: String,
    #[serde(default)]
    pub excerpts: Vec<Excerpt>,
    #[serde(default)]
    pub follow_ups: Vec<SearchResult>,
}

impl SearchResult {
    pub fn new(query: impl Into<String>, answer: impl Into<String>, excerpts: Vec<Excerpt>) -> Self {
        Self {
            query: query.into(),
            answer: answer.into(),
            excerpts,
            follow_ups: Vec::new(),
        }
    }
}

/// 树结构错误
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TreeError {
    #[error("No result at index {0}")]
    NotFound(usize),

    #[error("Follow-up capacity ({max}) reached for result {root}")]
    CapacityExceeded { root: usize, max: usize },
}

/// 根结果的有序集合；根数量不设上限
#[derive(Clone, Debug)]
pub struct ConversationTree {
    roots: Vec<SearchResult>,
    max_follow_ups: usize,
}

impl ConversationTree {
    pub fn new(max_follow_ups: usize) -> Self {
        Self {
            roots: Vec::new(),
            max_follow_ups,
        }
    }

    /// 追加根结果，返回新下标；总是成功
    pub fn append_root(&mut self, result: SearchResult) -> usize {
        self.roots.push(result);
        self.roots.len() - 1
    }

    /// 在 root_index 下插入或覆盖追问
    ///
    /// 同 query 的追问已存在时原位替换（下标不变），返回 (下标, false)；
    /// 否则追加，返回 (下标, true)。容量满且无同 query 条目时拒绝。
    pub fn upsert_follow_up(
        &mut self,
        root_index: usize,
        result: SearchResult,
    ) -> Result<(usize, bool), TreeError> {
        let max = self.max_follow_ups;
        let root = self
            .roots
            .get_mut(root_index)
            .ok_or(TreeError::NotFound(root_index))?;

        if let Some(existing) = root
            .follow_ups
            .iter()
            .position(|f| f.query == result.query)
        {
            root.follow_ups[existing] = result;
            return Ok((existing, false));
        }

        if root.follow_ups.len() >= max {
            return Err(TreeError::CapacityExceeded {
                root: root_index,
                max,
            });
        }

        root.follow_ups.push(result);
        Ok((root.follow_ups.len() - 1, true))
    }

    /// 重新生成时整体替换根结果，原有追问随之丢弃
    pub fn replace_root(&mut self, index: usize, result: SearchResult) -> Result<(), TreeError> {
        let slot = self
            .roots
            .get_mut(index)
            .ok_or(TreeError::NotFound(index))?;
        *slot = result;
        Ok(())
    }

    /// 提交前的容量预检：同 query 可覆盖故不占新位
    pub fn can_add_follow_up(&self, root_index: usize, query: &str) -> Result<(), TreeError> {
        let root = self
            .roots
            .get(root_index)
            .ok_or(TreeError::NotFound(root_index))?;
        if root.follow_ups.iter().any(|f| f.query == query) {
            return Ok(());
        }
        if root.follow_ups.len() >= self.max_follow_ups {
            return Err(TreeError::CapacityExceeded {
                root: root_index,
                max: self.max_follow_ups,
            });
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&SearchResult> {
        self.roots.get(index)
    }

    pub fn roots(&self) -> &[SearchResult] {
        &self.roots
    }

    pub fn max_follow_ups(&self) -> usize {
        self.max_follow_ups
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(query: &str) -> SearchResult {
        SearchResult::new(query, format!("answer to {}", query), vec![])
    }

    #[test]
    fn test_append_root_returns_index() {
        let mut tree = ConversationTree::new(5);
        assert_eq!(tree.append_root(result("a")), 0);
        assert_eq!(tree.append_root(result("b")), 1);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_upsert_appends_distinct_queries() {
        let mut tree = ConversationTree::new(5);
        tree.append_root(result("root"));
        assert_eq!(tree.upsert_follow_up(0, result("f1")), Ok((0, true)));
        assert_eq!(tree.upsert_follow_up(0, result("f2")), Ok((1, true)));
        assert_eq!(tree.get(0).unwrap().follow_ups.len(), 2);
    }

    #[test]
    fn test_upsert_same_query_overwrites_in_place() {
        let mut tree = ConversationTree::new(5);
        tree.append_root(result("root"));
        tree.upsert_follow_up(0, result("f1")).unwrap();
        tree.upsert_follow_up(0, result("f2")).unwrap();

        let mut updated = result("f1");
        updated.answer = "second answer".to_string();
        assert_eq!(tree.upsert_follow_up(0, updated), Ok((0, false)));

        let root = tree.get(0).unwrap();
        assert_eq!(root.follow_ups.len(), 2);
        assert_eq!(root.follow_ups[0].answer, "second answer");
    }

    #[test]
    fn test_capacity_enforced() {
        let mut tree = ConversationTree::new(2);
        tree.append_root(result("root"));
        tree.upsert_follow_up(0, result("f1")).unwrap();
        tree.upsert_follow_up(0, result("f2")).unwrap();

        assert_eq!(
            tree.upsert_follow_up(0, result("f3")),
            Err(TreeError::CapacityExceeded { root: 0, max: 2 })
        );
        // 同 query 在满容量时仍可覆盖
        assert_eq!(tree.upsert_follow_up(0, result("f2")), Ok((1, false)));
    }

    #[test]
    fn test_can_add_follow_up_precheck() {
        let mut tree = ConversationTree::new(1);
        tree.append_root(result("root"));
        assert_eq!(tree.can_add_follow_up(0, "f1"), Ok(()));
        tree.upsert_follow_up(0, result("f1")).unwrap();

        assert_eq!(tree.can_add_follow_up(0, "f1"), Ok(()));
        assert_eq!(
            tree.can_add_follow_up(0, "f2"),
            Err(TreeError::CapacityExceeded { root: 0, max: 1 })
        );
        assert_eq!(tree.can_add_follow_up(7, "x"), Err(TreeError::NotFound(7)));
    }

    #[test]
    fn test_replace_root_discards_follow_ups() {
        let mut tree = ConversationTree::new(5);
        tree.append_root(result("root"));
        tree.upsert_follow_up(0, result("f1")).unwrap();

        tree.replace_root(0, result("root")).unwrap();
        assert!(tree.get(0).unwrap().follow_ups.is_empty());

        assert_eq!(
            tree.replace_root(3, result("x")),
            Err(TreeError::NotFound(3))
        );
    }
}
