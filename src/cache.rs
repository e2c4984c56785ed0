//! Bounded recency cache for tool-call reasoning.
//!
//! Entries are keyed by tool-call id. When the cache is full, the entry
//! untouched for the longest time is evicted. Both `get` hits and `put`
//! count as a touch.

use std::num::NonZeroUsize;
use std::time::SystemTime;

use parking_lot::Mutex;

/// Reasoning text produced alongside a tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasoningItem {
    /// Tool-call id that produced the reasoning.
    pub id: String,
    /// Accumulated reasoning text.
    pub content: String,
    /// Last time this entry was written or read.
    pub last_used: SystemTime,
}

impl ReasoningItem {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            last_used: SystemTime::now(),
        }
    }
}

/// Storage seam used by the request and response transformers.
///
/// Implementations carry their own synchronization; callers never lock
/// around them.
pub trait ReasoningStore: Send + Sync {
    fn put(&self, key: &str, item: ReasoningItem);
    fn get(&self, key: &str) -> Option<ReasoningItem>;
}

/// Capacity-bounded LRU cache.
///
/// Every operation goes through one mutex: a `get` hit reorders the
/// recency list, so there is no read-only access path.
pub struct LruCache {
    capacity: usize,
    /// `None` when capacity is zero.
    entries: Option<Mutex<lru::LruCache<String, ReasoningItem>>>,
}

impl LruCache {
    /// Create a cache holding at most `capacity` entries.
    ///
    /// A capacity of zero yields a cache that never stores anything.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: NonZeroUsize::new(capacity).map(|cap| Mutex::new(lru::LruCache::new(cap))),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert or overwrite `key`, marking it most recently used.
    pub fn put(&self, key: &str, mut item: ReasoningItem) {
        let Some(entries) = &self.entries else {
            return;
        };

        item.last_used = SystemTime::now();
        if let Some((evicted, _)) = entries.lock().push(key.to_string(), item) {
            if evicted != key {
                tracing::debug!(tool_call_id = %evicted, "Evicted reasoning entry");
            }
        }
    }

    /// Look up `key`. A hit refreshes its recency and `last_used`.
    pub fn get(&self, key: &str) -> Option<ReasoningItem> {
        let mut entries = self.entries.as_ref()?.lock();
        let item = entries.get_mut(key)?;
        item.last_used = SystemTime::now();
        Some(item.clone())
    }

    pub fn size(&self) -> usize {
        self.entries.as_ref().map_or(0, |entries| entries.lock().len())
    }

    pub fn clear(&self) {
        if let Some(entries) = &self.entries {
            entries.lock().clear();
        }
    }
}

impl ReasoningStore for LruCache {
    fn put(&self, key: &str, item: ReasoningItem) {
        LruCache::put(self, key, item);
    }

    fn get(&self, key: &str) -> Option<ReasoningItem> {
        LruCache::get(self, key)
    }
}
