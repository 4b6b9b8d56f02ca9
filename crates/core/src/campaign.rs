//! Campaign bookkeeping types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{Error, Result};
use crate::window::DateWindow;

/// Length of generated campaign IDs.
pub const CAMPAIGN_ID_LEN: usize = 8;

/// Campaign processing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Error,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

/// A campaign: a customer upload plus the window to attribute it over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Stored file name of the uploaded customer list.
    pub customer_file: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub status: CampaignStatus,
}

impl Campaign {
    /// Attribution window of this campaign.
    pub fn window(&self) -> Result<DateWindow> {
        DateWindow::new(self.start_date, self.end_date)
    }
}

/// Request to create a campaign.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewCampaign {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl NewCampaign {
    /// Validates the request and builds a pending campaign.
    ///
    /// `customer_file` is derived from the generated ID and the uploaded
    /// file name.
    pub fn into_campaign(self, upload_name: &str) -> Result<Campaign> {
        self.validate()
            .map_err(|e| Error::validation(e.to_string()))?;
        DateWindow::new(self.start_date, self.end_date)?;

        let id = new_campaign_id();
        let customer_file = format!("{}_{}", id, sanitize_file_name(upload_name));

        Ok(Campaign {
            id,
            name: self.name.trim().to_string(),
            start_date: self.start_date,
            end_date: self.end_date,
            customer_file,
            created_at: Utc::now(),
            status: CampaignStatus::Pending,
        })
    }
}

/// Short random campaign ID.
pub fn new_campaign_id() -> String {
    Uuid::new_v4().simple().to_string()[..CAMPAIGN_ID_LEN].to_string()
}

/// Keeps ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "upload.csv".to_string()
    } else {
        trimmed.to_string()
    }
}
