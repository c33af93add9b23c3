//! Eviction Order Module
//!
//! Tracks key order for bounded-store eviction.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

// == Eviction Policy ==
/// Which key leaves first when the store is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Oldest-inserted first. Reads and overwrites do not change the order.
    #[default]
    Fifo,
    /// Least-recently-used first. Reads and overwrites move a key to the back.
    Lru,
}

impl FromStr for EvictionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fifo" => Ok(EvictionPolicy::Fifo),
            "lru" => Ok(EvictionPolicy::Lru),
            other => Err(format!("unknown eviction policy: {other}")),
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvictionPolicy::Fifo => write!(f, "fifo"),
            EvictionPolicy::Lru => write!(f, "lru"),
        }
    }
}

// == Eviction Order ==
/// Keys in eviction order.
///
/// - Front = next to evict
/// - Back = most recently inserted (or used, under LRU)
#[derive(Debug, Default)]
pub struct EvictionOrder {
    policy: EvictionPolicy,
    order: VecDeque<String>,
}

impl EvictionOrder {
    pub fn new(policy: EvictionPolicy) -> Self {
        Self {
            policy,
            order: VecDeque::new(),
        }
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    // == Record Insert ==
    /// Records a write of `key`.
    ///
    /// New keys go to the back. An existing key keeps its place under FIFO
    /// and moves to the back under LRU.
    pub fn record_insert(&mut self, key: &str) {
        if self.contains(key) {
            if self.policy == EvictionPolicy::Lru {
                self.move_to_back(key);
            }
            return;
        }
        self.order.push_back(key.to_string());
    }

    // == Record Access ==
    /// Records a read hit on `key`. Only LRU reorders.
    pub fn record_access(&mut self, key: &str) {
        if self.policy == EvictionPolicy::Lru && self.contains(key) {
            self.move_to_back(key);
        }
    }

    // == Remove ==
    pub fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    // == Evict Next ==
    /// Returns and removes the key that should leave next.
    pub fn evict_next(&mut self) -> Option<String> {
        self.order.pop_front()
    }

    /// Returns the next eviction candidate without removing it.
    pub fn peek_next(&self) -> Option<&String> {
        self.order.front()
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.order.iter().any(|k| k == key)
    }

    fn move_to_back(&mut self, key: &str) {
        self.remove(key);
        self.order.push_back(key.to_string());
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_new() {
        let order = EvictionOrder::new(EvictionPolicy::Fifo);
        assert!(order.is_empty());
        assert_eq!(order.len(), 0);
        assert_eq!(order.policy(), EvictionPolicy::Fifo);
    }

    #[test]
    fn test_fifo_evicts_in_insertion_order() {
        let mut order = EvictionOrder::new(EvictionPolicy::Fifo);

        order.record_insert("key1");
        order.record_insert("key2");
        order.record_insert("key3");

        assert_eq!(order.evict_next(), Some("key1".to_string()));
        assert_eq!(order.evict_next(), Some("key2".to_string()));
        assert_eq!(order.evict_next(), Some("key3".to_string()));
        assert_eq!(order.evict_next(), None);
    }

    #[test]
    fn test_fifo_ignores_access_and_overwrite() {
        let mut order = EvictionOrder::new(EvictionPolicy::Fifo);

        order.record_insert("a");
        order.record_insert("b");
        order.record_access("a");
        order.record_insert("a");

        assert_eq!(order.len(), 2);
        assert_eq!(order.peek_next(), Some(&"a".to_string()));
    }

    #[test]
    fn test_lru_access_moves_to_back() {
        let mut order = EvictionOrder::new(EvictionPolicy::Lru);

        order.record_insert("a");
        order.record_insert("b");
        order.record_insert("c");
        order.record_access("a");

        assert_eq!(order.evict_next(), Some("b".to_string()));
        assert_eq!(order.evict_next(), Some("c".to_string()));
        assert_eq!(order.evict_next(), Some("a".to_string()));
    }

    #[test]
    fn test_lru_overwrite_moves_to_back() {
        let mut order = EvictionOrder::new(EvictionPolicy::Lru);

        order.record_insert("a");
        order.record_insert("b");
        order.record_insert("a");

        assert_eq!(order.len(), 2);
        assert_eq!(order.peek_next(), Some(&"b".to_string()));
    }

    #[test]
    fn test_access_unknown_key_is_noop() {
        let mut order = EvictionOrder::new(EvictionPolicy::Lru);
        order.record_access("ghost");
        assert!(order.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut order = EvictionOrder::new(EvictionPolicy::Fifo);

        order.record_insert("key1");
        order.record_insert("key2");
        order.record_insert("key3");
        order.remove("key2");
        order.remove("nonexistent");

        assert_eq!(order.len(), 2);
        assert!(!order.contains("key2"));
        assert!(order.contains("key1"));
        assert!(order.contains("key3"));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("fifo".parse::<EvictionPolicy>(), Ok(EvictionPolicy::Fifo));
        assert_eq!(" LRU ".parse::<EvictionPolicy>(), Ok(EvictionPolicy::Lru));
        assert!("random".parse::<EvictionPolicy>().is_err());
        assert_eq!(EvictionPolicy::Lru.to_string(), "lru");
    }
}
