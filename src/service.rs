// Cached GitHub data service.
// Fetches live data through the client and falls back to fresh cache snapshots on failure.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cache::{self, CacheStore, DEFAULT_TTL, FileStore, keys};
use crate::config::Config;
use crate::error::Result;
use crate::github::{GitHubClient, Profile, Repository, RepositoryOptions};

/// Where a returned value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Fetched from GitHub during this call.
    Live,
    /// Served from a snapshot because the live fetch failed.
    Cache { cached_at: DateTime<Utc> },
}

/// A value together with its origin, so callers can flag stale data.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub data: T,
    pub origin: Origin,
}

impl<T> Fetched<T> {
    fn live(data: T) -> Self {
        Self {
            data,
            origin: Origin::Live,
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self.origin, Origin::Cache { .. })
    }
}

/// GitHub profile and repository reads with stale-cache fallback.
pub struct GitHubService {
    client: GitHubClient,
    cache: Arc<dyn CacheStore>,
    featured: Vec<String>,
    ttl: Duration,
}

impl GitHubService {
    pub fn new(client: GitHubClient, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            client,
            cache,
            featured: Vec::new(),
            ttl: DEFAULT_TTL,
        }
    }

    /// Build the client and file cache described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = GitHubClient::from_config(config)?;
        let store = match &config.cache_dir {
            Some(dir) => FileStore::new(dir),
            None => FileStore::open_default()?,
        };
        Ok(Self::new(client, Arc::new(store)).with_featured(config.featured_repos.clone()))
    }

    /// Repository names served by [`featured_repositories`](Self::featured_repositories).
    pub fn with_featured(mut self, names: Vec<String>) -> Self {
        self.featured = names;
        self
    }

    pub fn client(&self) -> &GitHubClient {
        &self.client
    }

    pub fn featured(&self) -> &[String] {
        &self.featured
    }

    pub async fn profile(&self, cancel: &CancellationToken) -> Result<Fetched<Profile>> {
        let live = self.client.get_profile(cancel).await;
        self.settle(keys::PROFILE, live)
    }

    pub async fn repositories(
        &self,
        options: &RepositoryOptions,
        cancel: &CancellationToken,
    ) -> Result<Fetched<Vec<Repository>>> {
        let live = self.client.list_repositories(options, cancel).await;
        self.settle(&keys::repositories(options), live)
    }

    /// Look up the configured featured repositories.
    ///
    /// Individual failures are dropped. The cached batch is served only when every
    /// lookup failed transiently; otherwise the live subset is returned.
    pub async fn featured_repositories(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Fetched<Vec<Repository>>> {
        self.lookup_batch(&self.featured, keys::FEATURED, cancel)
            .await
    }

    /// Look up an arbitrary set of repositories with the same partial-failure policy.
    /// Batches other than the configured list are cached under their own key.
    pub async fn lookup_repositories(
        &self,
        names: &[String],
        cancel: &CancellationToken,
    ) -> Result<Fetched<Vec<Repository>>> {
        if names == self.featured.as_slice() {
            return self.featured_repositories(cancel).await;
        }
        self.lookup_batch(names, &keys::featured_batch(names), cancel)
            .await
    }

    async fn lookup_batch(
        &self,
        names: &[String],
        key: &str,
        cancel: &CancellationToken,
    ) -> Result<Fetched<Vec<Repository>>> {
        if names.is_empty() {
            return Ok(Fetched::live(Vec::new()));
        }

        let batch = self.client.fetch_featured(names, cancel).await?;

        if batch.all_failed() {
            if let Some(cached) = self.fallback::<Vec<Repository>>(key) {
                return Ok(cached);
            }
            warn!(
                key,
                failed = batch.failed.len(),
                "no repositories resolved and no cached batch available"
            );
        } else if batch.failed.is_empty() {
            self.store(key, &batch.repositories);
        }

        Ok(Fetched::live(batch.repositories))
    }

    /// Cache a live success, or substitute a fresh snapshot for a transient failure.
    fn settle<T>(&self, key: &str, live: Result<T>) -> Result<Fetched<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        match live {
            Ok(data) => {
                self.store(key, &data);
                Ok(Fetched::live(data))
            }
            Err(e) if e.allows_cache_fallback() => match self.fallback(key) {
                Some(cached) => Ok(cached),
                None => Err(e),
            },
            Err(e) => Err(e),
        }
    }

    fn fallback<T: DeserializeOwned>(&self, key: &str) -> Option<Fetched<T>> {
        let cached = cache::read_if_valid::<T>(self.cache.as_ref(), key, self.ttl)?;
        info!(
            key,
            cached_at = %cached.timestamp,
            "live fetch failed, serving cached data"
        );
        Some(Fetched {
            data: cached.data,
            origin: Origin::Cache {
                cached_at: cached.timestamp,
            },
        })
    }

    fn store<T: Serialize>(&self, key: &str, data: &T) {
        if let Err(e) = cache::write_cached(self.cache.as_ref(), key, data) {
            warn!(key, error = %e, "failed to cache data");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CachedData, MemoryStore};
    use crate::error::FolioError;

    fn service(store: Arc<MemoryStore>) -> GitHubService {
        let client = GitHubClient::new("octocat", None).unwrap();
        GitHubService::new(client, store)
    }

    #[test]
    fn test_settle_caches_success() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());

        let fetched = service.settle(keys::PROFILE, Ok(vec![1u32, 2])).unwrap();
        assert_eq!(fetched.origin, Origin::Live);

        let cached: CachedData<Vec<u32>> =
            cache::read_cached(&*store, keys::PROFILE).unwrap().unwrap();
        assert_eq!(cached.data, vec![1, 2]);
    }

    #[test]
    fn test_not_found_is_never_covered_by_cache() {
        let store = Arc::new(MemoryStore::new());
        cache::write_cached(&*store, keys::PROFILE, &vec![1u32]).unwrap();
        let service = service(store);

        let result: Result<Fetched<Vec<u32>>> =
            service.settle(keys::PROFILE, Err(FolioError::NotFound("users/ghost".into())));
        assert!(matches!(result, Err(FolioError::NotFound(_))));
    }

    #[test]
    fn test_cancellation_is_never_covered_by_cache() {
        let store = Arc::new(MemoryStore::new());
        cache::write_cached(&*store, keys::PROFILE, &vec![1u32]).unwrap();
        let service = service(store);

        let result: Result<Fetched<Vec<u32>>> =
            service.settle(keys::PROFILE, Err(FolioError::Cancelled));
        assert!(matches!(result, Err(FolioError::Cancelled)));
    }

    #[tokio::test]
    async fn test_no_featured_configured() {
        let service = service(Arc::new(MemoryStore::new()));

        let fetched = service
            .featured_repositories(&CancellationToken::new())
            .await
            .unwrap();
        assert!(fetched.data.is_empty());
        assert!(!fetched.is_cached());
    }
}
