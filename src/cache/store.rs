// Cache store for reading and writing cached data.
// Handles JSON serialization and TTL checking over any key-value backend.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::error::Result;

/// How long a cached snapshot may stand in for live data: 24 hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Key-value storage for cache entries.
///
/// Values are opaque strings; the store never interprets them.
pub trait CacheStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete the value under `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Wrapper for cached data with metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedData<T> {
    /// The cached data.
    pub data: T,
    /// When the data was cached, stored as epoch milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl<T> CachedData<T> {
    /// Create a new cached data entry stamped with the current time.
    pub fn new(data: T) -> Self {
        Self {
            data,
            timestamp: Utc::now(),
        }
    }

    /// Time elapsed since capture. Entries from the future count as fresh.
    pub fn age(&self) -> Duration {
        Utc::now()
            .signed_duration_since(self.timestamp)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Check if this cached data has expired based on TTL.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() >= ttl
    }

    /// Check if this cached data is still valid (not expired).
    pub fn is_valid(&self, ttl: Duration) -> bool {
        !self.is_expired(ttl)
    }
}

/// Read a cache entry regardless of its age.
pub fn read_cached<T: DeserializeOwned>(
    store: &dyn CacheStore,
    key: &str,
) -> Result<Option<CachedData<T>>> {
    let Some(contents) = store.get(key)? else {
        return Ok(None);
    };

    let cached: CachedData<T> = serde_json::from_str(&contents)?;
    Ok(Some(cached))
}

/// Read a cache entry if it is younger than `ttl`.
///
/// Expired entries are deleted. Unreadable entries are logged and treated as absent.
pub fn read_if_valid<T: DeserializeOwned>(
    store: &dyn CacheStore,
    key: &str,
    ttl: Duration,
) -> Option<CachedData<T>> {
    match read_cached::<T>(store, key) {
        Ok(Some(cached)) if cached.is_valid(ttl) => Some(cached),
        Ok(Some(cached)) => {
            debug!(key, cached_at = %cached.timestamp, "cache entry expired, removing");
            if let Err(e) = store.remove(key) {
                warn!(key, error = %e, "failed to remove expired cache entry");
            }
            None
        }
        Ok(None) => None,
        Err(e) => {
            warn!(key, error = %e, "ignoring unreadable cache entry");
            None
        }
    }
}

/// Write data to cache as JSON, stamped with the current time.
pub fn write_cached<T: Serialize>(store: &dyn CacheStore, key: &str, data: &T) -> Result<()> {
    let cached = CachedData::new(data);
    let json = serde_json::to_string(&cached)?;
    store.set(key, &json)
}
