pub mod chunked_fetcher;
pub mod chunker;
pub mod flattener;

pub use chunked_fetcher::{ChunkedFetcher, FetchRequest, RunState, RunSummary};
pub use chunker::{chunk, chunk_range, Chunks};
pub use flattener::{flatten, missing_variables, normalize_time, PartialDataWarning};
