use chrono::NaiveDate;
use thiserror::Error;

use crate::models::DateRange;

pub type Result<T> = std::result::Result<T, FetchError>;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid chunk span of {max_span_days} day(s) for {start} to {end}")]
    InvalidRange {
        start: NaiveDate,
        end: NaiveDate,
        max_span_days: i64,
    },

    #[error("Invalid variable selection: {0}")]
    InvalidVariables(String),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("HTTP client setup failed: {0}")]
    ClientSetup(#[source] reqwest::Error),

    #[error("Invalid request URL: {0}")]
    Url(String),

    #[error("Fetch of {url} failed after {attempts} attempt(s)")]
    FetchExhausted {
        attempts: u32,
        url: String,
        #[source]
        source: AttemptError,
    },

    #[error("Chunk {index} ({range}) failed")]
    ChunkFailed {
        index: usize,
        range: DateRange,
        #[source]
        source: Box<FetchError>,
    },

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Cannot resume from {path}: {reason}")]
    Resume { path: String, reason: String },
}

/// Failure of a single request attempt. Every variant is retryable.
#[derive(Error, Debug)]
pub enum AttemptError {
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("HTTP status {status} from {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("response body is not valid archive JSON: {0}")]
    Decode(#[source] reqwest::Error),
}

impl FetchError {
    /// The innermost fetch failure, looking through chunk wrappers.
    pub fn root(&self) -> &FetchError {
        match self {
            FetchError::ChunkFailed { source, .. } => source.root(),
            other => other,
        }
    }
}
