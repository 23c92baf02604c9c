//! Embedding cache.
//!
//! [`CachedEmbedder`] wraps any [`Embedder`] and remembers vectors for texts
//! it has already embedded, so re-ingesting a document or repeating a
//! question skips the provider call.
//!
//! # Cache Key Strategy
//!
//! Keys are SHA-256 hashes of `model_name | text`, so two models never share
//! an entry.
//!
//! # Example
//!
//! ```ignore
//! use docent::rag::cache::CachedEmbedder;
//!
//! let embedder = CachedEmbedder::new(provider.create_embedder(), 4096)?;
//! let v1 = embedder.embed("hello world").await?; // provider call
//! let v2 = embedder.embed("hello world").await?; // cache hit
//! assert_eq!(embedder.stats().hits, 1);
//! ```

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::trace;

use super::embeddings::Embedder;
use crate::types::{AppError, Result};

/// Statistics for cache performance monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of entries in cache
    pub entries: usize,
}

impl CacheStats {
    /// Calculate hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// LRU-cached embedder.
///
/// The lock is only held for lookups and inserts, never across the provider
/// call. Two concurrent misses on the same text may both reach the provider.
pub struct CachedEmbedder<E> {
    inner: E,
    cache: Mutex<LruCache<String, Vec<f32>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<E: Embedder> CachedEmbedder<E> {
    /// Wrap `inner` with a cache holding at most `capacity` vectors.
    pub fn new(inner: E, capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| {
            AppError::InvalidArgument("cache capacity must be > 0".to_string())
        })?;

        Ok(Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    /// Compute a cache key for the given text under this embedder's model.
    pub fn compute_key(&self, text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.inner.model_name().as_bytes());
        hasher.update(b"|");
        hasher.update(text.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.cache.lock().len(),
        }
    }

    /// Drop every cached vector. Counters are kept.
    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }
}

#[async_trait]
impl<E: Embedder> Embedder for CachedEmbedder<E> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let key = self.compute_key(text);

        let cached = self.cache.lock().get(&key).cloned();
        if let Some(vector) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!("Embedding cache hit");
            return Ok(vector);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let vector = self.inner.embed(text).await?;
        self.cache.lock().put(key, vector.clone());
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
