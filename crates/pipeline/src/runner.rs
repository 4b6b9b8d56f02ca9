//! Sequential pipeline runner.
//!
//! Collector → Resolver → Enricher → Categorizer. Each stage waits for the
//! previous stage's full table.

use std::sync::Arc;
use std::time::Instant;

use attribution_core::limits::{DEFAULT_ADSET_CACHE_CAPACITY, DEFAULT_LOOKUP_CONCURRENCY};
use attribution_core::{CategorizedRecord, CategorySummary, DateWindow, Result};
use serde::{Deserialize, Serialize};
use store::StoreConnector;
use telemetry::metrics;
use tracing::{error, info, instrument};

use crate::categorizer::categorize_records;
use crate::collector::{CollectorStats, FormRecordCollector};
use crate::enrichment::{AdSetEnricher, EnricherStats};
use crate::resolver::{resolve, ResolverStats};

/// Pipeline tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum in-flight store lookups per stage
    #[serde(default = "default_lookup_concurrency")]
    pub lookup_concurrency: usize,
    /// Ad-set lookups memoized per run
    #[serde(default = "default_adset_cache_capacity")]
    pub adset_cache_capacity: u64,
}

fn default_lookup_concurrency() -> usize {
    DEFAULT_LOOKUP_CONCURRENCY
}

fn default_adset_cache_capacity() -> u64 {
    DEFAULT_ADSET_CACHE_CAPACITY
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            lookup_concurrency: default_lookup_concurrency(),
            adset_cache_capacity: default_adset_cache_capacity(),
        }
    }
}

/// Per-stage summaries of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageStats {
    pub collector: CollectorStats,
    pub resolver: ResolverStats,
    pub enricher: EnricherStats,
    pub categories: CategorySummary,
}

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub records: Vec<CategorizedRecord>,
    pub stats: StageStats,
}

/// The attribution pipeline.
pub struct AttributionPipeline {
    collector: FormRecordCollector,
    enricher: AdSetEnricher,
}

impl AttributionPipeline {
    pub fn new(connector: Arc<dyn StoreConnector>, config: &PipelineConfig) -> Self {
        Self {
            collector: FormRecordCollector::new(connector.clone(), config.lookup_concurrency),
            enricher: AdSetEnricher::new(
                connector,
                config.lookup_concurrency,
                config.adset_cache_capacity,
            ),
        }
    }

    /// Runs all four stages over `emails` within `window`.
    ///
    /// Fails when a collaborator cannot be opened; per-row misses and lookup
    /// errors are recorded in the rows instead.
    #[instrument(name = "pipeline", skip_all, fields(emails = emails.len()))]
    pub async fn run(&self, emails: &[String], window: &DateWindow) -> Result<PipelineOutput> {
        let started = Instant::now();
        metrics().pipeline_runs.inc();

        let result = self.run_stages(emails, window).await;
        let elapsed = started.elapsed().as_millis() as u64;
        metrics().pipeline_latency_ms.observe(elapsed);

        match &result {
            Ok(output) => info!(
                records = output.records.len(),
                elapsed_ms = elapsed,
                "Pipeline complete"
            ),
            Err(e) => {
                metrics().pipeline_failures.inc();
                error!(error = %e, elapsed_ms = elapsed, "Pipeline failed");
            }
        }
        result
    }

    async fn run_stages(&self, emails: &[String], window: &DateWindow) -> Result<PipelineOutput> {
        let collected = self.collector.collect(emails, window).await?;
        let resolved = resolve(collected.records);
        let enriched = self.enricher.enrich(resolved.records).await?;
        let categorized = categorize_records(enriched.records);

        Ok(PipelineOutput {
            records: categorized.records,
            stats: StageStats {
                collector: collected.stats,
                resolver: resolved.stats,
                enricher: enriched.stats,
                categories: categorized.summary,
            },
        })
    }
}
