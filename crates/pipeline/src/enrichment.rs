//! Ad-metadata enrichment.
//!
//! Copies campaign and ad names from the UTM fields and resolves `utm_term`
//! to a Meta ad-set name through the ad catalog.

use std::sync::Arc;
use std::time::Instant;

use attribution_core::{EnrichedRecord, Error, RecordStatus, ResolvedRecord, Result};
use futures::stream::{self, StreamExt};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use store::{AdCatalog, StoreConnector};
use telemetry::metrics;
use tracing::{debug, info, instrument, warn};

/// Enrichment summary.
///
/// Every `UTM_PRESENT` row lands in exactly one of `attempted` or `skipped`;
/// `failed` covers attempted rows only, so rows without an ad-set ID are
/// counted in `skipped` and never in `failed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnricherStats {
    pub total: usize,
    /// Rows with `UTM_PRESENT`.
    pub utm_present: usize,
    /// Rows looked up in the catalog.
    pub attempted: usize,
    pub succeeded: usize,
    /// Attempted rows without an ad-set name (miss or lookup error).
    pub failed: usize,
    /// `UTM_PRESENT` rows without an ad-set ID.
    pub skipped: usize,
    /// Lookups that errored.
    pub errors: usize,
}

/// Enriched rows plus summary.
#[derive(Debug, Clone)]
pub struct EnricherOutput {
    pub records: Vec<EnrichedRecord>,
    pub stats: EnricherStats,
}

enum Lookup {
    Skipped,
    Found(String),
    Missing,
    Failed,
}

/// Enricher stage.
pub struct AdSetEnricher {
    connector: Arc<dyn StoreConnector>,
    concurrency: usize,
    cache_capacity: u64,
}

impl AdSetEnricher {
    pub fn new(connector: Arc<dyn StoreConnector>, concurrency: usize, cache_capacity: u64) -> Self {
        Self {
            connector,
            concurrency: concurrency.max(1),
            cache_capacity,
        }
    }

    /// Runs the enrichment.
    ///
    /// The catalog is opened only when some row is `UTM_PRESENT`; failing to
    /// open it fails the stage.
    #[instrument(name = "enrich", skip_all, fields(records = records.len()))]
    pub async fn enrich(&self, records: Vec<ResolvedRecord>) -> Result<EnricherOutput> {
        let needs_catalog = records.iter().any(|r| r.status == RecordStatus::UtmPresent);
        if !needs_catalog {
            info!("No UTM records; skipping ad catalog");
            return Ok(enrich_rows(records, Vec::new()));
        }

        let opened = self.connector.open_ad_catalog().await;
        store::health::record_ad_catalog(&opened);
        let catalog = opened?;

        let output = enrich_with(
            catalog.as_ref(),
            records,
            self.concurrency,
            self.cache_capacity,
        )
        .await;
        catalog.close().await;
        Ok(output)
    }
}

/// Enriches against an open catalog.
///
/// Identical ad-set IDs are looked up once per call.
pub async fn enrich_with(
    catalog: &dyn AdCatalog,
    records: Vec<ResolvedRecord>,
    concurrency: usize,
    cache_capacity: u64,
) -> EnricherOutput {
    let started = Instant::now();
    let cache: Cache<String, Option<String>> = Cache::builder()
        .max_capacity(cache_capacity.max(1))
        .build();

    let ids: Vec<Option<String>> = records
        .iter()
        .map(|r| {
            if r.status == RecordStatus::UtmPresent {
                r.utm.adset_id().map(str::to_string)
            } else {
                None
            }
        })
        .collect();

    let lookups: Vec<Lookup> = stream::iter(ids)
        .map(|id| {
            let cache = cache.clone();
            async move {
                match id {
                    Some(id) => lookup(catalog, &cache, id).await,
                    None => Lookup::Skipped,
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let output = enrich_rows(records, lookups);
    let elapsed = started.elapsed().as_millis() as u64;
    metrics().enrich_latency_ms.observe(elapsed);
    info!(
        total = output.stats.total,
        attempted = output.stats.attempted,
        succeeded = output.stats.succeeded,
        failed = output.stats.failed,
        skipped = output.stats.skipped,
        errors = output.stats.errors,
        elapsed_ms = elapsed,
        "Enrichment complete"
    );
    output
}

async fn lookup(catalog: &dyn AdCatalog, cache: &Cache<String, Option<String>>, id: String) -> Lookup {
    let entry = cache
        .entry(id.clone())
        .or_try_insert_with(async {
            metrics().adset_lookups.inc();
            catalog.find_adset_name(&id).await
        })
        .await;

    match entry {
        Ok(entry) => {
            if !entry.is_fresh() {
                metrics().adset_cache_hits.inc();
            }
            match entry.into_value() {
                Some(name) => {
                    metrics().adset_lookup_hits.inc();
                    Lookup::Found(name)
                }
                None => {
                    debug!(adset_id = %id, "Ad-set not found");
                    Lookup::Missing
                }
            }
        }
        Err(e) => {
            let e: Arc<Error> = e;
            warn!(adset_id = %id, error = %e, "Ad-set lookup failed");
            metrics().adset_lookup_errors.inc();
            Lookup::Failed
        }
    }
}

/// Zips rows with their lookup outcomes. Missing outcomes count as skipped.
fn enrich_rows(records: Vec<ResolvedRecord>, lookups: Vec<Lookup>) -> EnricherOutput {
    let mut stats = EnricherStats {
        total: records.len(),
        ..Default::default()
    };
    let mut lookups = lookups.into_iter();

    let records = records
        .into_iter()
        .map(|record| {
            let utm_present = record.status == RecordStatus::UtmPresent;
            let mut enriched = EnrichedRecord::from_resolved(record);
            let outcome = lookups.next().unwrap_or(Lookup::Skipped);
            if !utm_present {
                return enriched;
            }

            stats.utm_present += 1;
            match outcome {
                Lookup::Skipped => stats.skipped += 1,
                Lookup::Found(name) => {
                    stats.attempted += 1;
                    stats.succeeded += 1;
                    enriched.adset_name = Some(name);
                }
                Lookup::Missing => {
                    stats.attempted += 1;
                    stats.failed += 1;
                }
                Lookup::Failed => {
                    stats.attempted += 1;
                    stats.failed += 1;
                    stats.errors += 1;
                }
            }
            enriched
        })
        .collect();

    EnricherOutput { records, stats }
}
