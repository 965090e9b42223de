// GitHub API module.
// Provides the client, retry policy, and types for the GitHub REST API.

pub mod client;
pub mod endpoints;
pub mod retry;
pub mod types;

pub use client::{GITHUB_API_BASE, GitHubClient};
pub use endpoints::FeaturedBatch;
pub use retry::RetryPolicy;
pub use types::*;
