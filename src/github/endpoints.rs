// GitHub API endpoint functions.
// Provides typed methods for fetching a user's profile and repositories.

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{FolioError, Result};

use super::client::GitHubClient;
use super::types::{Profile, Repository, RepositoryOptions};

/// Result of looking up a batch of featured repositories by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeaturedBatch {
    /// Repositories that resolved, in request order.
    pub repositories: Vec<Repository>,
    /// Names GitHub reported as not found.
    pub missing: Vec<String>,
    /// Names dropped because of transient failures.
    pub failed: Vec<String>,
}

impl FeaturedBatch {
    /// True when every requested name was dropped because of a transient failure.
    pub fn all_failed(&self) -> bool {
        self.repositories.is_empty() && self.missing.is_empty() && !self.failed.is_empty()
    }
}

impl GitHubClient {
    /// Get the configured user's public profile.
    pub async fn get_profile(&self, cancel: &CancellationToken) -> Result<Profile> {
        let endpoint = format!("/users/{}", self.username());
        self.get_json(&endpoint, &[], cancel).await
    }

    /// List the configured user's repositories, in the order GitHub returns them.
    pub async fn list_repositories(
        &self,
        options: &RepositoryOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<Repository>> {
        let endpoint = format!("/users/{}/repos", self.username());
        self.get_json(&endpoint, &options.query(), cancel).await
    }

    /// Get one of the configured user's repositories by name.
    pub async fn get_repository(&self, name: &str, cancel: &CancellationToken) -> Result<Repository> {
        let endpoint = format!("/repos/{}/{}", self.username(), name);
        self.get_json(&endpoint, &[], cancel).await
    }

    /// Look up each named repository concurrently and keep the ones that resolved.
    pub async fn get_featured_repositories<S: AsRef<str>>(
        &self,
        names: &[S],
        cancel: &CancellationToken,
    ) -> Result<Vec<Repository>> {
        Ok(self.fetch_featured(names, cancel).await?.repositories)
    }

    /// Like [`get_featured_repositories`](Self::get_featured_repositories), but reports
    /// which names were dropped and why.
    pub async fn fetch_featured<S: AsRef<str>>(
        &self,
        names: &[S],
        cancel: &CancellationToken,
    ) -> Result<FeaturedBatch> {
        if names.is_empty() {
            return Ok(FeaturedBatch::default());
        }
        if cancel.is_cancelled() {
            return Err(FolioError::Cancelled);
        }

        let lookups = names.iter().map(|name| async move {
            let name = name.as_ref();
            (name, self.get_repository(name, cancel).await)
        });
        let results = join_all(lookups).await;

        if cancel.is_cancelled() {
            return Err(FolioError::Cancelled);
        }

        let mut batch = FeaturedBatch::default();
        for (name, result) in results {
            match result {
                Ok(repo) => batch.repositories.push(repo),
                Err(e) if e.is_not_found() => {
                    warn!(repo = name, "featured repository not found, skipping");
                    batch.missing.push(name.to_string());
                }
                Err(e) => {
                    warn!(repo = name, error = %e, "failed to fetch featured repository, skipping");
                    batch.failed.push(name.to_string());
                }
            }
        }

        debug!(
            requested = names.len(),
            resolved = batch.repositories.len(),
            "fetched featured repositories"
        );
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_failed_requires_only_transient_drops() {
        let mut batch = FeaturedBatch {
            failed: vec!["flaky".to_string()],
            ..Default::default()
        };
        assert!(batch.all_failed());

        batch.missing.push("gone".to_string());
        assert!(!batch.all_failed());
    }

    #[test]
    fn test_empty_batch_has_not_failed() {
        assert!(!FeaturedBatch::default().all_failed());
    }

    #[tokio::test]
    async fn test_empty_names_skip_network() {
        // Unroutable base URL: any request would fail, so success proves none was sent.
        let client = GitHubClient::new("octocat", None)
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        let names: [&str; 0] = [];

        let repos = client
            .get_featured_repositories(&names, &CancellationToken::new())
            .await
            .unwrap();
        assert!(repos.is_empty());
        assert_eq!(client.rate_limit().await, None);
    }
}
