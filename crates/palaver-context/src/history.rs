//! History loading over the message store and runtime cache.
//!
//! [`ContextServices`] bundles the two collaborators (store, cache) and the
//! extractor options, and is passed explicitly into every operation that
//! needs conversation context — there are no process-wide singletons, so
//! tests and concurrent runs stay isolated.
//!
//! ## Failure policy
//!
//! Neither operation here ever returns an error. A store or cache failure
//! is logged as a warning and degrades to an empty entry list: the caller
//! cannot distinguish "no context existed" from "context loading failed",
//! by design — availability wins over strict failure signaling.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use palaver_core::errors::{CacheError, StoreError};
use palaver_core::ids::{ConversationId, RunId};

use crate::cache::{CacheBackend, RuntimeCacheKey};
use crate::entry::Entry;
use crate::extract::{ExtractOptions, extract_from_message, extract_from_tool_result};
use crate::store::MessageStore;

/// Internal failure carrier for the load path.
#[derive(Debug, Error)]
enum HistoryError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Dependency bundle for context operations.
///
/// Owned by the enclosing request or run scope and shared by reference;
/// operations on different `(conversation, run)` keys are fully
/// independent.
#[derive(Clone)]
pub struct ContextServices {
    store: Arc<dyn MessageStore>,
    cache: Arc<dyn CacheBackend>,
    options: ExtractOptions,
}

impl ContextServices {
    /// Create a service bundle from its collaborators.
    #[must_use]
    pub fn new(store: Arc<dyn MessageStore>, cache: Arc<dyn CacheBackend>) -> Self {
        Self {
            store,
            cache,
            options: ExtractOptions::default(),
        }
    }

    /// Override extractor options, builder-style.
    #[must_use]
    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// Load the ordered entry list for a conversation run.
    ///
    /// Cache-first: a cached list — even an empty one — is returned
    /// unchanged. On a miss, all persisted messages are fetched, extracted
    /// in message order, and the result seeds the cache under this key.
    ///
    /// Never fails; collaborator errors degrade to an empty list.
    pub async fn load_history(
        &self,
        conversation: &ConversationId,
        run: Option<&RunId>,
    ) -> Vec<Entry> {
        let key = RuntimeCacheKey::new(conversation, run);
        match self.try_load(conversation, &key).await {
            Ok(entries) => entries,
            Err(error) => {
                warn!(%conversation, key = key.as_str(), %error, "history load failed, returning empty context");
                Vec::new()
            }
        }
    }

    async fn try_load(
        &self,
        conversation: &ConversationId,
        key: &RuntimeCacheKey,
    ) -> Result<Vec<Entry>, HistoryError> {
        if let Some(cached) = self.cache.get(key).await? {
            debug!(key = key.as_str(), entries = cached.len(), "runtime cache hit");
            return Ok(cached);
        }

        let messages = self.store.get_messages(conversation).await?;
        let mut entries = Vec::new();
        for message in &messages {
            entries.extend(extract_from_message(message, self.options).entries);
        }
        debug!(
            key = key.as_str(),
            messages = messages.len(),
            entries = entries.len(),
            "rebuilt history from persisted messages"
        );

        self.cache.set(key, entries.clone()).await?;
        Ok(entries)
    }

    /// Append entries extracted from a just-completed tool call to the
    /// cached run list.
    ///
    /// A no-op (with a warning) when the key has never been seeded —
    /// callers must run [`ContextServices::load_history`] first.
    ///
    /// Known limitation: the read-modify-write here is not serialized per
    /// key. The caller contract is sequential within one run; two
    /// concurrent appends to the same key can lose one of the updates.
    pub async fn add_runtime_cached_entry(
        &self,
        conversation: &ConversationId,
        run: Option<&RunId>,
        result: &Value,
    ) {
        let key = RuntimeCacheKey::new(conversation, run);
        let extraction = extract_from_tool_result(result);

        let existing = match self.cache.get(&key).await {
            Ok(Some(entries)) => entries,
            Ok(None) => {
                warn!(
                    %conversation,
                    key = key.as_str(),
                    "runtime cache not seeded for this run, dropping tool result entries"
                );
                return;
            }
            Err(error) => {
                warn!(key = key.as_str(), %error, "runtime cache read failed, dropping tool result entries");
                return;
            }
        };

        let mut updated = existing;
        let added = extraction.entries.len();
        updated.extend(extraction.entries);

        if let Err(error) = self.cache.set(&key, updated).await {
            warn!(key = key.as_str(), %error, "runtime cache write failed, tool result entries lost");
        } else {
            debug!(key = key.as_str(), added, "appended tool result entries to runtime cache");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
