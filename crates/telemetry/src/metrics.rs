//! In-process pipeline metrics.
//!
//! Counters and latency histograms are updated by the pipeline stages and
//! summarized in logs and the health endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Histogram for latency tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 10ms, 50ms, 100ms, 500ms, 1s, 5s, 10s, 30s, 60s, 300s
    buckets: [AtomicU64; 10],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 10] = [10, 50, 100, 500, 1_000, 5_000, 10_000, 30_000, 60_000, 300_000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        let last = Self::BUCKET_BOUNDS.len() - 1;
        let index = Self::BUCKET_BOUNDS
            .iter()
            .position(|&bound| ms <= bound)
            .unwrap_or(last);
        self.buckets[index].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    /// Returns bucket counts.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Collected metrics for the attribution pipeline.
#[derive(Debug, Default)]
pub struct Metrics {
    // Runs
    pub pipeline_runs: Counter,
    pub pipeline_failures: Counter,

    // Collector
    pub emails_collected: Counter,
    pub submissions_found: Counter,
    pub submission_lookup_errors: Counter,

    // Enricher
    pub adset_lookups: Counter,
    pub adset_lookup_hits: Counter,
    pub adset_lookup_errors: Counter,
    pub adset_cache_hits: Counter,

    // Categorizer / validator
    pub records_categorized: Counter,
    pub validation_failures: Counter,

    // Latency histograms
    pub collect_latency_ms: Histogram,
    pub enrich_latency_ms: Histogram,
    pub pipeline_latency_ms: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub pipeline_runs: u64,
    pub pipeline_failures: u64,
    pub emails_collected: u64,
    pub submissions_found: u64,
    pub submission_lookup_errors: u64,
    pub adset_lookups: u64,
    pub adset_lookup_hits: u64,
    pub adset_lookup_errors: u64,
    pub adset_cache_hits: u64,
    pub records_categorized: u64,
    pub validation_failures: u64,
    pub collect_latency_mean_ms: f64,
    pub enrich_latency_mean_ms: f64,
    pub pipeline_latency_mean_ms: f64,
}

impl Metrics {
    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            pipeline_runs: self.pipeline_runs.get(),
            pipeline_failures: self.pipeline_failures.get(),
            emails_collected: self.emails_collected.get(),
            submissions_found: self.submissions_found.get(),
            submission_lookup_errors: self.submission_lookup_errors.get(),
            adset_lookups: self.adset_lookups.get(),
            adset_lookup_hits: self.adset_lookup_hits.get(),
            adset_lookup_errors: self.adset_lookup_errors.get(),
            adset_cache_hits: self.adset_cache_hits.get(),
            records_categorized: self.records_categorized.get(),
            validation_failures: self.validation_failures.get(),
            collect_latency_mean_ms: self.collect_latency_ms.mean(),
            enrich_latency_mean_ms: self.enrich_latency_ms.mean(),
            pipeline_latency_mean_ms: self.pipeline_latency_ms.mean(),
        }
    }
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
