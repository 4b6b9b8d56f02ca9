//! Post-run consistency checks.
//!
//! Compares the categorized table against the uploaded customer list and
//! reports discrepancies. Never mutates rows and never fails the run.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use attribution_core::limits::MAX_REPORTED_MISSING_EMAILS;
use attribution_core::{
    email_key, CategorizedRecord, Category, CategoryCount, CategorySummary, CustomerTable,
    RecordStatus,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use telemetry::metrics;
use tracing::{error, info, warn};

/// Overall outcome of the validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Success,
    Warning,
    Failed,
    /// The validation itself could not run.
    Error,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Failed => "failed",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckResult {
    Passed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub min: NaiveDateTime,
    pub max: NaiveDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationStats {
    pub input_total_rows: usize,
    pub input_unique_emails: usize,
    pub output_emails: usize,
    pub duplicates: usize,
    pub missing_emails: usize,
    pub extra_emails: usize,
    pub categories: Vec<CategoryCount>,
    /// `UTM_PRESENT` rows without `utm_source`.
    pub utm_null_source: usize,
    /// `UTM_PRESENT` rows without `utm_campaign`.
    pub utm_null_campaign: usize,
    /// `AD_META` rows without an ad-set name.
    pub meta_null_adset: usize,
    pub date_range: Option<DateRange>,
}

impl ValidationStats {
    /// Output emails as a percentage of unique input emails.
    pub fn match_rate(&self) -> f64 {
        if self.input_unique_emails == 0 {
            0.0
        } else {
            self.output_emails as f64 / self.input_unique_emails as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationChecks {
    pub email_count: CheckResult,
    pub missing_emails: CheckResult,
}

impl Default for ValidationChecks {
    fn default() -> Self {
        Self {
            email_count: CheckResult::Passed,
            missing_emails: CheckResult::Passed,
        }
    }
}

/// Structured validation report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub status: ValidationStatus,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: ValidationStats,
    pub checks: ValidationChecks,
}

impl ValidationReport {
    /// Report for a validation that could not run.
    pub fn failed_to_run(message: impl Into<String>) -> Self {
        Self {
            status: ValidationStatus::Error,
            errors: vec![message.into()],
            warnings: Vec::new(),
            stats: ValidationStats::default(),
            checks: ValidationChecks::default(),
        }
    }
}

/// Reads the customer file and validates the output against it.
///
/// An unreadable file yields a report with status `error`.
pub fn validate_file(
    input: &Path,
    preferred_column: Option<&str>,
    output: &[CategorizedRecord],
) -> ValidationReport {
    match CustomerTable::from_path(input, preferred_column) {
        Ok(table) => validate(&table, output),
        Err(e) => {
            error!(path = %input.display(), error = %e, "Validation could not read input");
            metrics().validation_failures.inc();
            ValidationReport::failed_to_run(e.to_string())
        }
    }
}

/// Validates the categorized table against the customer table.
pub fn validate(input: &CustomerTable, output: &[CategorizedRecord]) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut checks = ValidationChecks::default();

    let input_emails = input.unique_emails();
    let input_keys: HashSet<String> = input_emails.iter().map(|e| email_key(e)).collect();
    let output_keys: BTreeSet<String> = output.iter().map(|r| email_key(r.email())).collect();

    let missing: Vec<&String> = input_emails
        .iter()
        .filter(|e| !output_keys.contains(&email_key(e)))
        .collect();
    let extra = output_keys.iter().filter(|k| !input_keys.contains(*k)).count();

    if missing.is_empty() {
        info!("All input emails present in output");
    } else {
        checks.missing_emails = CheckResult::Failed;
        errors.push(format!("{} emails missing from output", missing.len()));
        for email in missing.iter().take(MAX_REPORTED_MISSING_EMAILS) {
            errors.push(format!("Missing email: {}", email));
        }
        warn!(missing = missing.len(), "Emails missing from output");
    }

    if extra > 0 {
        warnings.push(format!("{} extra emails not present in input", extra));
    }

    let summary = CategorySummary::from_categories(output.iter().map(|r| r.category));

    let utm_rows: Vec<&CategorizedRecord> = output
        .iter()
        .filter(|r| r.status() == RecordStatus::UtmPresent)
        .collect();
    let utm_null_source = utm_rows.iter().filter(|r| r.utm().source.is_none()).count();
    let utm_null_campaign = utm_rows.iter().filter(|r| r.utm().campaign.is_none()).count();
    if utm_null_source > 0 {
        warnings.push(format!("{} UTM records without utm_source", utm_null_source));
    }
    if utm_null_campaign > 0 {
        warnings.push(format!("{} UTM records without utm_campaign", utm_null_campaign));
    }

    let meta_rows = summary.count(Category::AdMeta);
    let meta_null_adset = output
        .iter()
        .filter(|r| r.category == Category::AdMeta && r.adset_name().is_none())
        .count();
    if meta_null_adset > 0 {
        warnings.push(format!(
            "{} of {} Meta ad records without adset_name",
            meta_null_adset, meta_rows
        ));
    }

    let timestamps = output.iter().filter_map(|r| r.submitted_at());
    let date_range = timestamps.clone().min().zip(timestamps.max()).map(|(min, max)| DateRange { min, max });

    let status = if errors.is_empty() {
        ValidationStatus::Success
    } else if missing.is_empty() {
        ValidationStatus::Warning
    } else {
        ValidationStatus::Failed
    };

    let stats = ValidationStats {
        input_total_rows: input.row_count,
        input_unique_emails: input_emails.len(),
        output_emails: output_keys.len(),
        duplicates: input.row_count.saturating_sub(input_emails.len()),
        missing_emails: missing.len(),
        extra_emails: extra,
        categories: summary.categories,
        utm_null_source,
        utm_null_campaign,
        meta_null_adset,
        date_range,
    };

    if matches!(status, ValidationStatus::Failed) {
        metrics().validation_failures.inc();
    }

    info!(
        status = status.as_str(),
        errors = errors.len(),
        warnings = warnings.len(),
        input_emails = stats.input_unique_emails,
        output_emails = stats.output_emails,
        match_rate = format!("{:.2}", stats.match_rate()),
        "Validation complete"
    );

    ValidationReport {
        status,
        errors,
        warnings,
        stats,
        checks,
    }
}
