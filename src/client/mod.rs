pub mod archive_client;
pub mod retry;

pub use archive_client::{build_http_client, ArchiveClient};
pub use retry::{RetryExhausted, RetryPolicy, Retryable};
