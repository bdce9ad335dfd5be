//! Memoization of metrics computations.
//!
//! `compute` is pure, so a result can be reused for as long as the events,
//! the filter, and the parameters stay the same. The cache keys on a hash of
//! all three and holds a bounded number of results in a `moka` cache.

use crate::analysis::compute::try_compute;
use crate::error::MetricsError;
use crate::models::{ComputeParams, ContributionEvent, Metrics};
use moka::sync::Cache;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Default number of cached results.
pub const DEFAULT_CACHE_CAPACITY: u64 = 16;

/// Bounded memoization cache for [`Metrics`].
///
/// Safe to share between threads; lookups take `&self`.
#[derive(Debug)]
pub struct MetricsCache {
    entries: Cache<u64, Arc<Metrics>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for MetricsCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl MetricsCache {
    /// Create a cache holding at most `capacity` results (minimum 1).
    pub fn new(capacity: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(capacity.max(1)).build(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the cached metrics for these inputs, computing them on a miss.
    ///
    /// Invalid input is reported and never cached.
    pub fn get_or_compute(
        &self,
        events: &[ContributionEvent],
        filter_country: Option<&str>,
        params: &ComputeParams,
    ) -> Result<Arc<Metrics>, MetricsError> {
        let key = cache_key(events, filter_country, params);

        if let Some(metrics) = self.entries.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key, "metrics cache hit");
            return Ok(metrics);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let metrics = Arc::new(try_compute(events, filter_country, params)?);
        self.entries.insert(key, Arc::clone(&metrics));
        debug!(key, "metrics cache miss");

        Ok(metrics)
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Number of cached results, after applying pending evictions.
    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all cached results, keeping the counters.
    pub fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks();
    }
}

/// Hash of everything a computation depends on.
fn cache_key(
    events: &[ContributionEvent],
    filter_country: Option<&str>,
    params: &ComputeParams,
) -> u64 {
    let mut hasher = DefaultHasher::new();
    events.hash(&mut hasher);
    filter_country.hash(&mut hasher);
    params.top_n_countries.hash(&mut hasher);
    params.top_k_contributors.hash(&mut hasher);
    params.weights.coverage.to_bits().hash(&mut hasher);
    params.weights.diversity.to_bits().hash(&mut hasher);
    params.diversity_saturation.hash(&mut hasher);
    params.last_seen.hash(&mut hasher);
    hasher.finish()
}
