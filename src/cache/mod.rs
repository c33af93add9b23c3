//! Cache Module
//!
//! Request cache with TTL expiration, bounded size, pattern invalidation and
//! a durable mirror.

mod entry;
mod key;
mod order;
mod stats;
mod storage;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use key::{derive_key, CacheKey, TtlPolicy, DEFAULT_TTL};
pub use order::{EvictionOrder, EvictionPolicy};
pub use stats::CacheStats;
pub use storage::{DurableStore, FileStorage, MemoryStorage};
pub use store::CacheStore;

// == Public Constants ==
/// Default in-memory capacity
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Namespace of cache entries inside the durable store
pub const DEFAULT_STORAGE_PREFIX: &str = "muslifie_cache_";
