// folio-github: resilient reads of a GitHub user's profile and repositories.
// Retries transient failures with backoff, honors rate limits, and falls back to cached snapshots.

pub mod cache;
pub mod config;
pub mod error;
pub mod github;
pub mod service;

pub use cache::{CacheStore, FileStore, MemoryStore};
pub use config::Config;
pub use error::{FetchFailure, FolioError, Result};
pub use github::{
    FeaturedBatch, GitHubClient, Profile, RateLimit, RepoSort, Repository, RepositoryOptions,
    RetryPolicy, SortDirection,
};
pub use service::{Fetched, GitHubService, Origin};
