//! Cache Store Module
//!
//! Bounded in-memory map of request key to cached response, mirrored into a
//! durable key/value store so entries survive a restart.
//!
//! The in-memory map is a warm layer over the durable mirror: a miss in
//! memory falls through to one durable read, and every removal (expiry,
//! invalidation, eviction) is applied to both tiers in the same call.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{
    CacheEntry, CacheStats, DurableStore, EvictionOrder, EvictionPolicy, MemoryStorage,
    DEFAULT_MAX_ENTRIES, DEFAULT_STORAGE_PREFIX,
};
use crate::config::Config;

// == Cache Store ==
pub struct CacheStore {
    /// In-memory entries
    entries: HashMap<String, CacheEntry>,
    /// Eviction order tracker
    order: EvictionOrder,
    stats: CacheStats,
    max_entries: usize,
    /// Durable mirror, shared with unrelated persisted state
    storage: Box<dyn DurableStore>,
    /// Namespace of this cache's keys inside `storage`
    storage_prefix: String,
}

impl fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("entries", &self.entries.len())
            .field("max_entries", &self.max_entries)
            .field("policy", &self.order.policy())
            .field("storage_prefix", &self.storage_prefix)
            .finish()
    }
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store. Call [`CacheStore::load_from_storage`] to
    /// pre-populate it from the mirror.
    ///
    /// # Arguments
    /// * `max_entries` - In-memory capacity (at least 1)
    /// * `policy` - Which entry is evicted when full
    /// * `storage` - Durable mirror backend
    /// * `storage_prefix` - Namespace for this cache's durable keys
    pub fn new(
        max_entries: usize,
        policy: EvictionPolicy,
        storage: Box<dyn DurableStore>,
        storage_prefix: impl Into<String>,
    ) -> Self {
        Self {
            entries: HashMap::new(),
            order: EvictionOrder::new(policy),
            stats: CacheStats::new(),
            max_entries: max_entries.max(1),
            storage,
            storage_prefix: storage_prefix.into(),
        }
    }

    /// Store backed by a private in-memory mirror.
    pub fn in_memory(max_entries: usize) -> Self {
        Self::new(
            max_entries,
            EvictionPolicy::Fifo,
            Box::new(MemoryStorage::new()),
            DEFAULT_STORAGE_PREFIX,
        )
    }

    pub fn from_config(config: &Config, storage: Box<dyn DurableStore>) -> Self {
        Self::new(
            config.max_entries,
            config.eviction_policy,
            storage,
            config.storage_prefix.clone(),
        )
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}{}", self.storage_prefix, key)
    }

    // == Load From Storage ==
    /// Pre-populates memory with every live entry in the mirror, oldest first.
    ///
    /// Expired or unreadable durable entries are removed. Returns the number
    /// of entries loaded.
    pub fn load_from_storage(&mut self) -> usize {
        let now = current_timestamp_ms();
        let mut live = Vec::new();
        for key in self.durable_cache_keys() {
            match self.read_durable(&key) {
                Some(entry) if !entry.is_expired_at(now) => live.push((key, entry)),
                Some(_) => self.remove_durable(&key),
                None => {}
            }
        }

        live.sort_by_key(|(_, entry)| entry.created_at);
        let mut loaded = 0;
        for (key, entry) in live {
            self.insert_in_memory(key, entry);
            loaded += 1;
        }

        info!(
            loaded,
            resident = self.entries.len(),
            "Cache pre-populated from durable storage"
        );
        loaded
    }

    // == Get ==
    /// Returns the cached payload for `key` if it is live.
    ///
    /// Memory is checked first; on a memory miss the durable mirror is read
    /// once and a live entry is promoted into memory. Expired entries are
    /// removed from both tiers.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let now = current_timestamp_ms();

        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired_at(now) {
                let data = entry.data.clone();
                debug!(key, ttl_remaining_ms = entry.ttl_remaining_ms(), "Cache hit");
                self.order.record_access(key);
                self.stats.record_hit();
                return Some(data);
            }

            debug!(key, "Cache entry expired");
            self.remove_everywhere(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            self.stats.set_total_entries(self.entries.len());
            return None;
        }

        self.hydrate(key, now)
    }

    fn hydrate(&mut self, key: &str, now: i64) -> Option<Value> {
        let Some(entry) = self.read_durable(key) else {
            self.stats.record_miss();
            return None;
        };

        if entry.is_expired_at(now) {
            debug!(key, "Durable cache entry expired");
            self.remove_durable(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return None;
        }

        debug!(key, "Cache hit from durable storage");
        let data = entry.data.clone();
        self.insert_in_memory(key.to_string(), entry);
        self.stats.record_hit();
        Some(data)
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl`.
    ///
    /// When memory is full and `key` is new, exactly one entry is evicted
    /// first. The write is mirrored to durable storage; a failed durable write
    /// is logged and the in-memory entry stays authoritative.
    pub fn set(&mut self, key: impl Into<String>, value: Value, ttl: Duration) {
        let key = key.into();
        let entry = CacheEntry::new(value, ttl);
        let encoded = entry.to_json();

        self.insert_in_memory(key.clone(), entry);

        match encoded {
            Ok(raw) => {
                if let Err(e) = self.storage.set_item(&self.storage_key(&key), &raw) {
                    warn!(key = %key, error = %e, "Failed to persist cache entry");
                }
            }
            Err(e) => warn!(key = %key, error = %e, "Failed to encode cache entry"),
        }
    }

    fn insert_in_memory(&mut self, key: String, entry: CacheEntry) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            if let Some(evicted) = self.order.evict_next() {
                self.entries.remove(&evicted);
                self.remove_durable(&evicted);
                self.stats.record_eviction();
                debug!(key = %evicted, "Evicted cache entry");
            }
        }

        self.order.record_insert(&key);
        self.entries.insert(key, entry);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Invalidate ==
    /// Removes cached reads.
    ///
    /// With a pattern, every key containing it is removed from both tiers,
    /// including keys that are only in the durable mirror. Without one,
    /// memory is cleared and every durable key under this cache's prefix is
    /// removed; other durable keys are left alone.
    ///
    /// Returns the number of distinct cache keys removed.
    pub fn invalidate(&mut self, pattern: Option<&str>) -> usize {
        let removed = match pattern {
            Some(pattern) => {
                let mut matching: BTreeSet<String> = self
                    .entries
                    .keys()
                    .filter(|key| key.contains(pattern))
                    .cloned()
                    .collect();
                matching.extend(
                    self.durable_cache_keys()
                        .into_iter()
                        .filter(|key| key.contains(pattern)),
                );
                for key in &matching {
                    self.remove_everywhere(key);
                }
                matching.len()
            }
            None => {
                let mut cleared: BTreeSet<String> =
                    self.entries.drain().map(|(key, _)| key).collect();
                self.order.clear();
                for key in self.durable_cache_keys() {
                    self.remove_durable(&key);
                    cleared.insert(key);
                }
                cleared.len()
            }
        };

        self.stats.record_invalidations(removed);
        self.stats.set_total_entries(self.entries.len());
        if removed > 0 {
            info!(pattern = pattern.unwrap_or("*"), removed, "Cache invalidated");
        }
        removed
    }

    // == Cleanup Expired ==
    /// Removes every expired in-memory entry from both tiers, then drops
    /// expired or unreadable durable entries under the prefix that are not
    /// resident in memory.
    ///
    /// Returns the number of in-memory entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove_everywhere(key);
        }

        let pruned = self.prune_durable(now);
        if pruned > 0 {
            debug!(pruned, "Pruned stale durable cache entries");
        }

        self.stats.record_expirations(expired.len());
        self.stats.set_total_entries(self.entries.len());
        expired.len()
    }

    fn prune_durable(&self, now: i64) -> usize {
        let mut pruned = 0;
        for key in self.durable_cache_keys() {
            if self.entries.contains_key(&key) {
                continue;
            }
            let raw = match self.storage.get_item(&self.storage_key(&key)) {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(e) => {
                    warn!(key, error = %e, "Failed to read durable cache entry");
                    continue;
                }
            };
            match CacheEntry::from_json(&raw) {
                Ok(entry) if !entry.is_expired_at(now) => {}
                Ok(_) => {
                    self.remove_durable(&key);
                    pruned += 1;
                }
                Err(e) => {
                    warn!(key, error = %e, "Removing corrupt durable cache entry");
                    self.remove_durable(&key);
                    pruned += 1;
                }
            }
        }
        pruned
    }

    // == Durable Mirror Helpers ==
    /// Reads and decodes one durable entry. Read failures count as absent;
    /// corrupt entries are removed.
    fn read_durable(&self, key: &str) -> Option<CacheEntry> {
        let storage_key = self.storage_key(key);
        match self.storage.get_item(&storage_key) {
            Ok(Some(raw)) => match CacheEntry::from_json(&raw) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(key, error = %e, "Removing corrupt durable cache entry");
                    self.remove_durable(key);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key, error = %e, "Failed to read durable cache entry");
                None
            }
        }
    }

    fn remove_durable(&self, key: &str) {
        if let Err(e) = self.storage.remove_item(&self.storage_key(key)) {
            warn!(key, error = %e, "Failed to remove durable cache entry");
        }
    }

    fn remove_everywhere(&mut self, key: &str) {
        self.entries.remove(key);
        self.order.remove(key);
        self.remove_durable(key);
    }

    /// Cache keys (prefix stripped) present in the durable mirror. A listing
    /// failure is logged and reads as empty.
    fn durable_cache_keys(&self) -> Vec<String> {
        match self.storage.keys() {
            Ok(keys) => keys
                .into_iter()
                .filter_map(|storage_key| {
                    storage_key
                        .strip_prefix(&self.storage_prefix)
                        .map(str::to_string)
                })
                .collect(),
            Err(e) => {
                warn!(error = %e, "Failed to list durable cache entries");
                Vec::new()
            }
        }
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Whether `key` is resident in memory, regardless of expiry.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::in_memory(DEFAULT_MAX_ENTRIES)
    }
}
