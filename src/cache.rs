//! # Word Lookup Cache Module
//!
//! ## Purpose
//! Memoizes the expensive asynchronous "resolve metadata for word W in
//! language L" computation. For any key there is at most one in-flight or
//! resolved computation for the lifetime of the cache; every concurrent
//! caller for the same key shares that single computation's outcome.
//!
//! ## Input/Output Specification
//! - **Input**: a lookup key and the computation to run on first access
//! - **Output**: the shared outcome (value or error) of the key's single
//!   computation
//! - **Atomicity**: get-or-create is one atomic operation per key; the first
//!   caller's computation wins and all others receive it
//!
//! ## Key Features
//! - Failures are cached too, so a flapping service is not hammered once per
//!   occurrence per analysis
//! - Explicit `invalidate` and `invalidate_failures` for recovery after
//!   transient network errors
//! - Hit/miss/invalidation counters for the stats endpoint

use crate::errors::Result;
use crate::LookupKey;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type SharedComputation<V> = Shared<BoxFuture<'static, Result<V>>>;

/// Counters exposed through the stats endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
}

/// Shared memoization of word lookups, keyed by (term, language).
///
/// The map entry API gives the atomic check-then-insert that upholds the
/// at-most-once-per-key guarantee under concurrent first access; the stored
/// computation is a shared future, so callers that lose the insertion race
/// await the winner's work instead of issuing their own.
pub struct WordLookupCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    entries: DashMap<LookupKey, SharedComputation<V>>,
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
}

/// Cache over resolved words, as used by the resolver
pub type WordCache = WordLookupCache<Arc<crate::word::Word>>;

impl<V> WordLookupCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
        }
    }

    /// Return the key's shared outcome, starting `compute` only if this is
    /// the first access for the key.
    ///
    /// `compute` is invoked at most once per key for the cache's lifetime
    /// (until the key is explicitly invalidated); callers that find an entry
    /// in place never invoke their closure.
    pub async fn resolve<F, Fut>(&self, key: LookupKey, compute: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let shared = match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                let computation = compute().boxed().shared();
                entry.insert(computation.clone());
                computation
            }
        };

        // Awaiting happens outside the shard lock; the winner's future runs
        // here on first poll and every other caller polls the same state.
        shared.await
    }

    /// Drop the entry for `key`, forcing the next access to recompute.
    /// Returns whether an entry existed.
    pub fn invalidate(&self, key: &LookupKey) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.invalidations.fetch_add(1, Ordering::Relaxed);
        }
        removed
    }

    /// Drop every entry whose computation has resolved to an error, keeping
    /// successes and in-flight computations. Returns how many entries were
    /// dropped.
    pub fn invalidate_failures(&self) -> usize {
        let mut removed = 0usize;
        self.entries
            .retain(|_, computation| match computation.peek() {
                Some(Err(_)) => {
                    removed += 1;
                    false
                }
                _ => true,
            });
        self.invalidations.fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    /// Drop all entries
    pub fn clear(&self) {
        let len = self.entries.len();
        self.entries.clear();
        self.invalidations.fetch_add(len as u64, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }
}

impl<V> Default for WordLookupCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AnalysisError;
    use crate::Language;
    use std::sync::atomic::AtomicUsize;

    fn key(term: &str) -> LookupKey {
        LookupKey::new(term, Language::English)
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_computation() {
        let cache: WordLookupCache<u32> = WordLookupCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let make_compute = |calls: Arc<AtomicUsize>| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                Ok(7)
            }
        };

        let (a, b) = tokio::join!(
            cache.resolve(key("cat"), make_compute(Arc::clone(&calls))),
            cache.resolve(key("cat"), make_compute(Arc::clone(&calls))),
        );

        assert_eq!(a.expect("first caller"), 7);
        assert_eq!(b.expect("second caller"), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test]
    async fn distinct_keys_compute_independently() {
        let cache: WordLookupCache<String> = WordLookupCache::new();

        let a = cache
            .resolve(key("cat"), || async { Ok("feline".to_string()) })
            .await
            .expect("cat resolves");
        let b = cache
            .resolve(key("dog"), || async { Ok("canine".to_string()) })
            .await
            .expect("dog resolves");

        assert_ne!(a, b);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn failures_are_cached_until_invalidated() {
        let cache: WordLookupCache<u32> = WordLookupCache::new();
        let calls = AtomicUsize::new(0);

        fn failure() -> AnalysisError {
            AnalysisError::TransportFailure {
                source: "dict".into(),
                details: "timeout".into(),
            }
        }

        let first = cache
            .resolve(key("cat"), || async move { Err(failure()) })
            .await;
        assert_eq!(first, Err(failure()));

        // Second access must observe the cached failure without recomputing.
        let second = cache
            .resolve(key("cat"), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(1) }
            })
            .await;
        assert_eq!(second, Err(failure()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert!(cache.invalidate(&key("cat")));
        let third = cache.resolve(key("cat"), || async { Ok(42) }).await;
        assert_eq!(third, Ok(42));
    }

    #[tokio::test]
    async fn invalidate_failures_keeps_successes() {
        let cache: WordLookupCache<u32> = WordLookupCache::new();

        cache
            .resolve(key("cat"), || async { Ok(1) })
            .await
            .expect("success entry");
        let _ = cache
            .resolve(key("dog"), || async {
                Err(AnalysisError::TransportFailure {
                    source: "dict".into(),
                    details: "unreachable".into(),
                })
            })
            .await;

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.invalidate_failures(), 1);
        assert_eq!(cache.len(), 1);

        // The surviving entry is still served from cache.
        let cached = cache
            .resolve(key("cat"), || async { Ok(999) })
            .await
            .expect("cached success");
        assert_eq!(cached, 1);
    }

    #[test]
    fn invalidating_a_missing_key_is_a_no_op() {
        let cache: WordLookupCache<u32> = WordLookupCache::new();
        assert!(!cache.invalidate(&key("ghost")));
        assert_eq!(cache.stats().invalidations, 0);
    }
}
