use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Tracks load and cache activity for models
#[derive(Debug, Default)]
pub struct LoadMetrics {
    load_times: RwLock<HashMap<String, Duration>>,
    fetch_counts: RwLock<HashMap<String, u64>>,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    in_flight_joins: AtomicU64,
    failures: AtomicU64,
}

impl LoadMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record how long a successful load of `path` took
    pub fn record_load_time(&self, path: &str, duration: Duration) {
        self.load_times.write().insert(path.to_string(), duration);
    }

    /// Record a payload fetch for `path`
    pub fn record_fetch(&self, path: &str) {
        *self.fetch_counts.write().entry(path.to_string()).or_insert(0) += 1;
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a caller that attached to a load already in progress
    pub fn record_in_flight_join(&self) {
        self.in_flight_joins.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Cache hit rate as a percentage
    pub fn cache_hit_rate(&self) -> f32 {
        let hits = self.cache_hits() as f32;
        let misses = self.cache_misses() as f32;

        if hits + misses > 0.0 {
            hits / (hits + misses) * 100.0
        } else {
            0.0
        }
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn in_flight_joins(&self) -> u64 {
        self.in_flight_joins.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Duration of the most recent successful load of `path`
    pub fn last_load_time(&self, path: &str) -> Option<Duration> {
        self.load_times.read().get(path).copied()
    }

    /// Number of payload fetches issued for `path`
    pub fn fetch_count(&self, path: &str) -> u64 {
        self.fetch_counts.read().get(path).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> u64 {
        self.fetch_counts.read().values().sum()
    }

    pub fn all_load_times(&self) -> HashMap<String, Duration> {
        self.load_times.read().clone()
    }
}

/// A shareable handle to [`LoadMetrics`]
#[derive(Debug, Clone, Default)]
pub struct LoadMetricsHandle(Arc<LoadMetrics>);

impl LoadMetricsHandle {
    pub fn new() -> Self {
        Self(Arc::new(LoadMetrics::new()))
    }

    pub fn inner(&self) -> &LoadMetrics {
        &self.0
    }
}

impl std::ops::Deref for LoadMetricsHandle {
    type Target = LoadMetrics;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
