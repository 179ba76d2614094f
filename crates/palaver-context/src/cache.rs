//! Runtime cache collaborator.
//!
//! The runtime cache holds in-progress-run entry lists keyed by
//! `(conversation, run)`. Lists are created lazily on first load, appended
//! to as tool results stream in, and expire as a whole on a fixed TTL.
//! Individual entries are never evicted.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use palaver_core::errors::CacheError;
use palaver_core::ids::{ConversationId, RunId};

use crate::entry::Entry;

// ─────────────────────────────────────────────────────────────────────────────
// Key
// ─────────────────────────────────────────────────────────────────────────────

/// Composite cache key for one run of one conversation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RuntimeCacheKey(String);

impl RuntimeCacheKey {
    /// Build a key from a conversation and an optional run.
    ///
    /// A missing run maps to the [`RunId::none`] sentinel so that entries
    /// extracted outside any run still share one slot.
    #[must_use]
    pub fn new(conversation: &ConversationId, run: Option<&RunId>) -> Self {
        let run = run.cloned().unwrap_or_else(RunId::none);
        Self(format!("{conversation}:{run}"))
    }

    /// The opaque string form used by cache backends.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend trait
// ─────────────────────────────────────────────────────────────────────────────

/// Keyed, TTL-bound storage for run entry lists.
///
/// TTL management belongs to the backend; callers only get and set whole
/// lists. `get` must distinguish "no list" (`None`) from "an empty list was
/// stored" (`Some(vec![])`) — the loader treats a present empty list as a
/// cache hit.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Fetch the entry list for a key, if one is cached and fresh.
    async fn get(&self, key: &RuntimeCacheKey) -> Result<Option<Vec<Entry>>, CacheError>;

    /// Store the entry list for a key, resetting its TTL.
    async fn set(&self, key: &RuntimeCacheKey, entries: Vec<Entry>) -> Result<(), CacheError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory backend
// ─────────────────────────────────────────────────────────────────────────────

/// Default TTL for cached run lists.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

struct Stored {
    entries: Vec<Entry>,
    inserted: Instant,
}

/// In-memory TTL cache.
///
/// Expiry is checked lazily on `get`; an expired list is removed and
/// reported as absent. There is no background sweeper — stale lists for
/// keys that are never read again are reclaimed only when overwritten,
/// which is acceptable for the short-lived run lifecycle this backs.
pub struct InMemoryCache {
    map: DashMap<RuntimeCacheKey, Stored>,
    ttl: Duration,
}

impl InMemoryCache {
    /// Create a cache with the default TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Create a cache with a specific TTL.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            map: DashMap::new(),
            ttl,
        }
    }

    /// Number of live (possibly stale) keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no keys are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheBackend for InMemoryCache {
    async fn get(&self, key: &RuntimeCacheKey) -> Result<Option<Vec<Entry>>, CacheError> {
        if let Some(stored) = self.map.get(key) {
            if stored.inserted.elapsed() <= self.ttl {
                return Ok(Some(stored.entries.clone()));
            }
        } else {
            return Ok(None);
        }
        // Expired: drop the whole list.
        let _ = self.map.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &RuntimeCacheKey, entries: Vec<Entry>) -> Result<(), CacheError> {
        let _ = self.map.insert(
            key.clone(),
            Stored {
                entries,
                inserted: Instant::now(),
            },
        );
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
