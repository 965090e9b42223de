// Cache module for fallback snapshots.
// Stores GitHub API responses so a failed live fetch can still be answered.

pub mod file;
pub mod keys;
pub mod memory;
pub mod store;

pub use file::{FileStore, cache_dir};
pub use memory::MemoryStore;
pub use store::{CacheStore, CachedData, DEFAULT_TTL, read_cached, read_if_valid, write_cached};
