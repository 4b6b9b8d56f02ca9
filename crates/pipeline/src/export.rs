//! CSV export of the categorized table.
//!
//! Writes one file with all rows plus one file per category present. Files are
//! UTF-8 with a BOM so spreadsheet tools pick up the encoding.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use attribution_core::{CategorizedRecord, Category, Result};
use chrono::Local;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Output column headers, category first.
pub const COLUMNS: [&str; 13] = [
    "category",
    "email",
    "submission_count",
    "status",
    "submitted_at",
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_content",
    "utm_term(adset_id)",
    "campaign_name",
    "ad_name",
    "adset_name",
];

static UNSAFE_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\-.]+").unwrap());

/// Files written for one export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedFiles {
    /// All rows.
    pub analysis: PathBuf,
    /// One file per category present, in category order.
    pub categories: Vec<CategoryFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFile {
    pub category: Category,
    pub path: PathBuf,
    pub rows: usize,
}

impl ExportedFiles {
    /// Every written path, analysis file first.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.analysis.as_path()).chain(self.categories.iter().map(|c| c.path.as_path()))
    }
}

/// Campaign name reduced to a file-name-safe token.
pub fn safe_name(campaign_name: &str) -> String {
    let replaced = UNSAFE_CHARS.replace_all(campaign_name.trim(), "_");
    let trimmed = replaced.trim_matches(|c| c == '_' || c == '.');
    if trimmed.is_empty() {
        "campaign".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Exports the table into `dir`, creating it if needed.
pub fn export_campaign(records: &[CategorizedRecord], campaign_name: &str, dir: &Path) -> Result<ExportedFiles> {
    std::fs::create_dir_all(dir)?;
    let name = safe_name(campaign_name);
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");

    let analysis = dir.join(format!("{}_ANALYSIS_{}.csv", name, timestamp));
    write_csv(&analysis, records.iter())?;

    let mut categories = Vec::new();
    for category in Category::ALL {
        let rows = records.iter().filter(|r| r.category == category).count();
        if rows == 0 {
            continue;
        }
        let path = dir.join(format!("{}_{}_{}.csv", name, category.as_str(), timestamp));
        write_csv(&path, records.iter().filter(|r| r.category == category))?;
        categories.push(CategoryFile { category, path, rows });
    }

    info!(
        dir = %dir.display(),
        rows = records.len(),
        files = categories.len() + 1,
        "Export complete"
    );

    Ok(ExportedFiles {
        analysis,
        categories,
    })
}

fn write_csv<'a>(path: &Path, rows: impl Iterator<Item = &'a CategorizedRecord>) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM)?;

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.write_record(row_fields(row))?;
    }
    writer.flush()?;
    Ok(())
}

fn row_fields(row: &CategorizedRecord) -> [String; 13] {
    let record = &row.enriched.record;
    let utm = &record.utm;
    let text = |value: &Option<String>| value.clone().unwrap_or_default();

    [
        row.category.as_str().to_string(),
        record.email.clone(),
        record.submission_count.to_string(),
        record.status.as_str().to_string(),
        record
            .submitted_at
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default(),
        text(&utm.source),
        text(&utm.medium),
        text(&utm.campaign),
        text(&utm.content),
        // Tab prefix keeps numeric ad-set IDs as text in spreadsheets.
        utm.term.as_ref().map(|t| format!("\t{}", t)).unwrap_or_default(),
        text(&row.enriched.campaign_name),
        text(&row.enriched.ad_name),
        text(&row.enriched.adset_name),
    ]
}
