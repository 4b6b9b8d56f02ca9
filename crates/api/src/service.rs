//! Campaign analysis: pipeline run, validation, export and bookkeeping.

use std::path::{Path, PathBuf};

use attribution_core::{
    Campaign, CampaignStatus, Category, CategorySummary, CustomerTable, Error, Result,
};
use chrono::{DateTime, Utc};
use pipeline::{export_campaign, validate_file, StageStats, ValidationReport};
use serde::{Deserialize, Serialize};
use store::RESULTS_FILE;
use tracing::{error, info, instrument};

use crate::state::AppState;

/// Headline numbers of an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalStats {
    /// Distinct input emails
    pub total_emails: usize,
    /// Share of `AD_META` rows, percent
    pub match_rate: f64,
    pub no_record: usize,
    pub empty: usize,
    pub ad_meta: usize,
    pub organic: usize,
    pub unknown: usize,
}

impl FinalStats {
    fn new(total_emails: usize, summary: &CategorySummary) -> Self {
        Self {
            total_emails,
            match_rate: (summary.percentage(Category::AdMeta) * 10.0).round() / 10.0,
            no_record: summary.count(Category::NoRecord),
            empty: summary.count(Category::Empty),
            ad_meta: summary.count(Category::AdMeta),
            organic: summary.count(Category::Organic),
            unknown: summary.count(Category::Unknown),
        }
    }
}

/// Everything an analysis produced; persisted as `results.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResults {
    pub campaign_id: String,
    pub email_column: String,
    pub stages: StageStats,
    pub validation: ValidationReport,
    /// Exported file names, analysis file first.
    pub exported_files: Vec<String>,
    pub final_stats: FinalStats,
    pub completed_at: DateTime<Utc>,
}

/// Runs the analysis of a stored campaign.
///
/// The campaign is `processing` while running, then `completed`, or `error`
/// if any step fails.
#[instrument(skip(state))]
pub async fn analyze_campaign(state: &AppState, id: &str) -> Result<AnalysisResults> {
    let campaign = state.campaigns.get(id).await?;
    state
        .campaigns
        .update_status(id, CampaignStatus::Processing)
        .await?;

    match run_analysis(state, &campaign).await {
        Ok(results) => {
            state
                .campaigns
                .update_status(id, CampaignStatus::Completed)
                .await?;
            info!(
                campaign_id = %id,
                match_rate = results.final_stats.match_rate,
                validation = results.validation.status.as_str(),
                "Analysis completed"
            );
            Ok(results)
        }
        Err(e) => {
            error!(campaign_id = %id, code = e.error_code(), error = %e, "Analysis failed");
            if let Err(status_err) = state.campaigns.update_status(id, CampaignStatus::Error).await {
                error!(campaign_id = %id, error = %status_err, "Failed to mark campaign as error");
            }
            Err(e)
        }
    }
}

async fn run_analysis(state: &AppState, campaign: &Campaign) -> Result<AnalysisResults> {
    let upload = state.campaigns.upload_path(&campaign.customer_file);
    let table = blocking({
        let upload = upload.clone();
        move || CustomerTable::from_path(upload, None)
    })
    .await?;

    let emails = table.unique_emails();
    if emails.is_empty() {
        return Err(Error::invalid_input("customer file contains no emails"));
    }
    info!(
        campaign_id = %campaign.id,
        email_column = %table.email_column,
        rows = table.row_count,
        emails = emails.len(),
        "Customer file loaded"
    );

    let window = campaign.window()?;
    let output = state.pipeline().run(&emails, &window).await?;

    let records = output.records;
    let output_dir = state.campaigns.results_dir(&campaign.id)?;
    let (validation, exported, records_len) = blocking({
        let column = table.email_column.clone();
        let name = campaign.name.clone();
        let dir = output_dir.clone();
        move || {
            let validation = validate_file(&upload, Some(&column), &records);
            let exported = export_campaign(&records, &name, &dir)?;
            Ok((validation, exported, records.len()))
        }
    })
    .await?;

    let results = AnalysisResults {
        campaign_id: campaign.id.clone(),
        email_column: table.email_column,
        final_stats: FinalStats::new(emails.len(), &output.stats.categories),
        stages: output.stats,
        validation,
        exported_files: exported.paths().filter_map(file_name).collect(),
        completed_at: Utc::now(),
    };

    let body = serde_json::to_vec_pretty(&results)?;
    tokio::fs::write(output_dir.join(RESULTS_FILE), body).await?;
    info!(campaign_id = %campaign.id, rows = records_len, "Results written");

    Ok(results)
}

/// Loads `results.json` of a campaign, if the campaign was analyzed.
pub async fn load_results(state: &AppState, id: &str) -> Result<Option<AnalysisResults>> {
    let path = state.campaigns.results_dir(id)?.join(RESULTS_FILE);
    match tokio::fs::read(&path).await {
        Ok(body) => Ok(Some(serde_json::from_slice(&body)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Resolves an exported file of a campaign; names with path components are
/// rejected.
pub fn exported_file_path(state: &AppState, id: &str, filename: &str) -> Result<PathBuf> {
    let plain = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n == filename);
    if !plain || filename.starts_with('.') || filename == RESULTS_FILE {
        return Err(Error::invalid_input(format!("invalid file name: {:?}", filename)));
    }
    Ok(state.campaigns.results_dir(id)?.join(filename))
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::internal(format!("blocking task failed: {}", e)))?
}
