//! Form-record collector.
//!
//! Fetches every submission of every input email within the window and emits
//! one `CustomerRecord` per submission, or a `NO_RECORD` row for emails
//! without any.

use std::sync::Arc;
use std::time::Instant;

use attribution_core::{dedupe_emails, CustomerRecord, DateWindow, RecordStatus, Result};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use store::{StoreConnector, SubmissionStore};
use telemetry::metrics;
use tracing::{info, instrument, warn};

/// Collection summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorStats {
    pub total_emails: usize,
    pub total_records: usize,
    pub no_record: usize,
    pub empty: usize,
    pub utm_present: usize,
    /// Emails whose lookup failed and were recorded as `NO_RECORD`.
    pub lookup_errors: usize,
}

impl CollectorStats {
    fn count(&mut self, status: RecordStatus) {
        match status {
            RecordStatus::NoRecord => self.no_record += 1,
            RecordStatus::Empty => self.empty += 1,
            RecordStatus::UtmPresent => self.utm_present += 1,
        }
    }
}

/// Collected rows plus summary.
#[derive(Debug, Clone)]
pub struct CollectorOutput {
    pub records: Vec<CustomerRecord>,
    pub stats: CollectorStats,
}

/// Collector stage.
pub struct FormRecordCollector {
    connector: Arc<dyn StoreConnector>,
    concurrency: usize,
}

impl FormRecordCollector {
    pub fn new(connector: Arc<dyn StoreConnector>, concurrency: usize) -> Self {
        Self {
            connector,
            concurrency: concurrency.max(1),
        }
    }

    /// Runs the collection.
    ///
    /// Fails only when the submission store cannot be opened.
    #[instrument(name = "collect", skip_all, fields(emails = emails.len()))]
    pub async fn collect(&self, emails: &[String], window: &DateWindow) -> Result<CollectorOutput> {
        let opened = self.connector.open_submission_store().await;
        store::health::record_submission_store(&opened);
        let store = opened?;

        let output = collect_from(store.as_ref(), emails, window, self.concurrency).await;
        store.close().await;
        Ok(output)
    }
}

/// Collects from an open store. Emails are deduplicated first.
pub async fn collect_from(
    store: &dyn SubmissionStore,
    emails: &[String],
    window: &DateWindow,
    concurrency: usize,
) -> CollectorOutput {
    let started = Instant::now();
    let emails = dedupe_emails(emails);
    info!(
        emails = emails.len(),
        start = %window.start(),
        end = %window.end(),
        "Collecting form submissions"
    );

    // Results come back in input order.
    let lookups: Vec<(String, Result<Vec<_>>)> = stream::iter(emails)
        .map(|email| async move {
            let result = store.find_submissions(&email, window).await;
            (email, result)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut stats = CollectorStats {
        total_emails: lookups.len(),
        ..Default::default()
    };
    let mut records = Vec::with_capacity(lookups.len());

    for (email, result) in lookups {
        let submissions = match result {
            Ok(submissions) => submissions,
            Err(e) => {
                warn!(email = %email, error = %e, "Submission lookup failed");
                metrics().submission_lookup_errors.inc();
                stats.lookup_errors += 1;
                Vec::new()
            }
        };

        metrics().submissions_found.inc_by(submissions.len() as u64);

        if submissions.is_empty() {
            records.push(CustomerRecord::no_record(email));
            continue;
        }

        let count = submissions.len();
        records.extend(
            submissions
                .iter()
                .map(|s| CustomerRecord::from_submission(email.clone(), count, s)),
        );
    }

    for record in &records {
        stats.count(record.status);
    }
    stats.total_records = records.len();

    let elapsed = started.elapsed().as_millis() as u64;
    metrics().emails_collected.inc_by(stats.total_emails as u64);
    metrics().collect_latency_ms.observe(elapsed);

    info!(
        total_emails = stats.total_emails,
        total_records = stats.total_records,
        no_record = stats.no_record,
        empty = stats.empty,
        utm_present = stats.utm_present,
        lookup_errors = stats.lookup_errors,
        elapsed_ms = elapsed,
        "Collection complete"
    );

    CollectorOutput { records, stats }
}
