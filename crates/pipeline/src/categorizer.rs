//! Categorizer stage.

use attribution_core::{categorize, CategorizedRecord, CategorySummary, EnrichedRecord};
use telemetry::metrics;
use tracing::info;

/// Categorized rows plus their frequency table.
#[derive(Debug, Clone)]
pub struct CategorizerOutput {
    pub records: Vec<CategorizedRecord>,
    pub summary: CategorySummary,
}

/// Assigns a category to every row. Pure apart from logging and metrics.
pub fn categorize_records(records: Vec<EnrichedRecord>) -> CategorizerOutput {
    let records: Vec<CategorizedRecord> = records
        .into_iter()
        .map(|enriched| CategorizedRecord {
            category: categorize(enriched.record.status, enriched.record.utm.source.as_deref()),
            enriched,
        })
        .collect();

    let summary = CategorySummary::from_categories(records.iter().map(|r| r.category));
    metrics().records_categorized.inc_by(records.len() as u64);

    for entry in &summary.categories {
        info!(
            category = %entry.category,
            count = entry.count,
            percentage = format!("{:.1}", entry.percentage),
            "Category"
        );
    }

    CategorizerOutput { records, summary }
}
