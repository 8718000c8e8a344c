//! 会话层：问答树与每日配额

pub mod quota;
pub mod tree;

pub use quota::{FileQuotaStore, InMemoryQuotaStore, QuotaStore, QuotaTracker, Reservation};
pub use tree::{ConversationTree, Excerpt, SearchResult, TreeError};
