//! In-memory cache for client-side computations.
//!
//! Keyed by pocket name rather than rank: ranks stay stable within a
//! session, but names are what the prediction layer guarantees. Values
//! never expire — pocket geometry is immutable for the lifetime of a
//! prediction.

use dashmap::DashMap;
use std::future::Future;

/// Concurrent compute-once cache. Lookups clone the stored value.
pub struct ComputeCache<V: Clone> {
    values: DashMap<String, V>,
}

impl<V: Clone> Default for ComputeCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> ComputeCache<V> {
    pub fn new() -> Self {
        Self {
            values: DashMap::new(),
        }
    }

    /// Return the cached value for `key`, computing and storing it on a
    /// miss. The second element reports whether this was a hit, so
    /// callers can skip side effects (ledger appends) on repeats.
    pub async fn get_or_compute<F, Fut, E>(&self, key: &str, compute: F) -> Result<(V, bool), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.values.get(key) {
            return Ok((value.value().clone(), true));
        }
        let value = compute().await?;
        self.values.insert(key.to_string(), value.clone());
        Ok((value, false))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
