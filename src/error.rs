// Error types for folio-github.
// Separates definitive lookups (not found) from transient failures that exhausted their retries.

use reqwest::StatusCode;
use thiserror::Error;

/// The last transient cause observed before a fetch gave up.
#[derive(Error, Debug)]
pub enum FetchFailure {
    #[error("rate limited (HTTP 429)")]
    RateLimited,

    #[error("server error: HTTP {0}")]
    Server(StatusCode),

    #[error("unexpected status: HTTP {0}")]
    Status(StatusCode),

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[source] reqwest::Error),
}

impl FetchFailure {
    /// Whether another attempt may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchFailure::RateLimited | FetchFailure::Server(_) | FetchFailure::Network(_)
        )
    }
}

#[derive(Error, Debug)]
pub enum FolioError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Fetching {url} failed after {attempts} attempt(s): {source}")]
    FetchFailed {
        url: String,
        attempts: u32,
        #[source]
        source: FetchFailure,
    },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FolioError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FolioError::NotFound(_))
    }

    pub fn is_fetch_failed(&self) -> bool {
        matches!(self, FolioError::FetchFailed { .. })
    }

    /// Whether a cached snapshot may stand in for the failed fetch.
    pub fn allows_cache_fallback(&self) -> bool {
        self.is_fetch_failed()
    }
}

pub type Result<T> = std::result::Result<T, FolioError>;
