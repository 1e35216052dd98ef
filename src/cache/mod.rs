/// Response cache: TTL-keyed store consulted before any outbound API call
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Key/value store with per-entry expiration. An unexpired entry always
/// short-circuits the outbound call; expired entries read as absent.
pub trait ResponseCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value, ttl: Duration);
}

struct Entry {
    value: Value,
    expires_at: Instant,
}

/// In-process cache backed by a RwLock'd map. Concurrent requests racing to
/// populate the same key resolve last-writer-wins, which is fine: within a
/// TTL window every writer derived its value from the same upstream state.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResponseCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let entry = entries.get(key)?;
        if Instant::now() >= entry.expires_at {
            return None;
        }
        Some(entry.value.clone())
    }

    fn set(&self, key: &str, value: Value, ttl: Duration) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_get_returns_none_for_missing_key() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn test_set_then_get_returns_value() {
        let cache = MemoryCache::new();
        cache.set("k", json!({"a": 1}), Duration::from_secs(60));
        assert_eq!(cache.get("k"), Some(json!({"a": 1})));
    }

    #[test]
    fn test_expired_entry_reads_as_absent() {
        let cache = MemoryCache::new();
        cache.set("k", json!(1), Duration::from_secs(0));
        thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_overwrite_is_last_writer_wins() {
        let cache = MemoryCache::new();
        cache.set("k", json!("first"), Duration::from_secs(60));
        cache.set("k", json!("second"), Duration::from_secs(60));
        assert_eq!(cache.get("k"), Some(json!("second")));
    }

    #[test]
    fn test_set_prunes_expired_entries() {
        let cache = MemoryCache::new();
        cache.set("dead", json!(1), Duration::from_secs(0));
        thread::sleep(Duration::from_millis(5));
        cache.set("live", json!(2), Duration::from_secs(60));
        let entries = cache.entries.read().unwrap();
        assert!(!entries.contains_key("dead"));
        assert!(entries.contains_key("live"));
    }

    #[test]
    fn test_concurrent_readers_and_writers() {
        let cache = Arc::new(MemoryCache::new());
        let mut handles = Vec::new();

        for i in 0..8 {
            let c = cache.clone();
            handles.push(thread::spawn(move || {
                for j in 0..100 {
                    let key = format!("k{}", j % 10);
                    c.set(&key, json!(i * 100 + j), Duration::from_secs(60));
                    let _ = c.get(&key);
                }
            }));
        }

        for h in handles {
            h.join().expect("worker thread panicked");
        }

        // every surviving key must hold a value some writer actually stored
        for j in 0..10 {
            let v = cache.get(&format!("k{}", j)).expect("key should exist");
            assert!(v.is_number());
        }
    }
}
