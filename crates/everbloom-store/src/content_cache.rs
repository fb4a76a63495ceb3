//! Keyed content cache.
//!
//! Memoizes generated content per natural-language item key (a plant name,
//! an animal name, an ISO week). Generation calls are paid and slow, so the
//! core invariant is **at most one successful generation per key**: a hit
//! returns immediately without touching the generator, and only an `Ok`
//! result is ever stored; a failed generation leaves the key absent so a
//! later retry generates again.
//!
//! Entries never expire. Catalogs are small and static, so the cache is
//! unbounded: entries disappear only on explicit removal or a full wipe.

use std::collections::BTreeMap;
use std::future::Future;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cell::StateCell;
use crate::error::{StoreError, StoreResult};
use crate::store::Store;

/// A cached value plus the moment it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The generated content.
    pub value: T,
    /// When the entry was stored.
    pub written_at: DateTime<Utc>,
}

/// A persistent map from case-sensitive item key to generated content.
pub struct ContentCache<T> {
    cell: StateCell<BTreeMap<String, CacheEntry<T>>>,
}

impl<T> Clone for ContentCache<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T> ContentCache<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + 'static,
{
    /// Bind a cache to its own namespace.
    pub fn new(store: Store, namespace: &'static str, schema_version: u32) -> Self {
        Self {
            cell: StateCell::new(store, namespace, schema_version, BTreeMap::new),
        }
    }

    /// Look up the cached value for `key`.
    pub async fn get(&self, key: &str) -> Option<T> {
        self.cell.get().await.get(key).map(|e| e.value.clone())
    }

    /// Look up the full entry (value + write timestamp) for `key`.
    pub async fn entry(&self, key: &str) -> Option<CacheEntry<T>> {
        self.cell.get().await.get(key).cloned()
    }

    /// Insert or overwrite the value for `key`.
    pub async fn put(&self, key: &str, value: T) -> StoreResult<()> {
        let key = key.to_owned();
        self.cell
            .update(move |map| {
                map.insert(
                    key,
                    CacheEntry {
                        value,
                        written_at: Utc::now(),
                    },
                );
            })
            .await?;
        Ok(())
    }

    /// Remove a single entry (user-authored sub-resources). Returns whether
    /// the key was present.
    pub async fn remove(&self, key: &str) -> StoreResult<bool> {
        let mut map = self.cell.get().await;
        let removed = map.remove(key).is_some();
        if removed {
            self.cell.set(&map).await?;
        }
        Ok(removed)
    }

    /// Drop every entry in this cache's namespace.
    pub async fn clear(&self) -> StoreResult<()> {
        self.cell.set(&BTreeMap::new()).await
    }

    /// All cached keys, in lexicographic order.
    pub async fn keys(&self) -> Vec<String> {
        self.cell.get().await.keys().cloned().collect()
    }

    /// Number of cached entries.
    pub async fn len(&self) -> usize {
        self.cell.get().await.len()
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.cell.get().await.is_empty()
    }

    /// Return the cached value for `key`, or invoke `generator` exactly once
    /// to produce it.
    ///
    /// On a hit the generator is never called. On a miss, a successful
    /// result is persisted before it is returned; a failed result persists
    /// nothing, so the next call for the same key generates again.
    ///
    /// Two interleaved calls for the same missing key may both invoke their
    /// generators; the last completed `put` wins. See the crate docs for why
    /// that trade is acceptable here.
    pub async fn get_or_generate<G, Fut, E>(&self, key: &str, generator: G) -> Result<T, E>
    where
        G: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<StoreError>,
    {
        if let Some(hit) = self.get(key).await {
            debug!(namespace = self.cell.namespace(), key, "content cache hit");
            return Ok(hit);
        }

        debug!(
            namespace = self.cell.namespace(),
            key, "content cache miss, generating"
        );
        let value = generator().await?;
        self.put(key, value.clone()).await?;
        Ok(value)
    }
}

// ── tests ────────────────────────────────────────────────────────────
