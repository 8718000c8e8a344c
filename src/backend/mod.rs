//! 后端层：弹性请求、重试与查询后端实现（HTTP / Mock）

pub mod fetch;
pub mod http;
pub mod mock;
pub mod retry;
pub mod traits;

pub use fetch::{ensure_success, FetchError, ResilientFetcher};
pub use http::HttpBackend;
pub use mock::MockBackend;
pub use retry::{RetriesExhausted, RetryPolicy};
pub use traits::{QueryBackend, QueryRequest, QueryResponse};
