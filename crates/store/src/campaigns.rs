//! Campaign record store backed by one JSON file per campaign.
//!
//! Layout under the data directory:
//!
//! ```text
//! campaigns/<id>.json   campaign record
//! uploads/<file>        uploaded customer lists
//! results/<id>/         exported tables and results.json
//! ```

use std::path::{Path, PathBuf};

use attribution_core::{Campaign, CampaignStatus, Error, Result};
use tracing::{debug, info, warn};

/// File name of the per-campaign analysis results.
pub const RESULTS_FILE: &str = "results.json";

/// File-backed campaign store.
#[derive(Debug, Clone)]
pub struct CampaignStore {
    root: PathBuf,
}

impl CampaignStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: data_dir.into(),
        }
    }

    /// Creates the directory layout.
    pub async fn init(&self) -> Result<()> {
        for dir in [self.campaigns_dir(), self.uploads_dir(), self.results_root()] {
            tokio::fs::create_dir_all(&dir).await?;
        }
        debug!(root = %self.root.display(), "Campaign store initialized");
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join("uploads")
    }

    fn campaigns_dir(&self) -> PathBuf {
        self.root.join("campaigns")
    }

    fn results_root(&self) -> PathBuf {
        self.root.join("results")
    }

    /// Path of an uploaded customer list.
    pub fn upload_path(&self, customer_file: &str) -> PathBuf {
        self.uploads_dir().join(customer_file)
    }

    /// Output directory of a campaign.
    pub fn results_dir(&self, id: &str) -> Result<PathBuf> {
        check_id(id)?;
        Ok(self.results_root().join(id))
    }

    fn record_path(&self, id: &str) -> Result<PathBuf> {
        check_id(id)?;
        Ok(self.campaigns_dir().join(format!("{}.json", id)))
    }

    /// Writes the campaign record, replacing any previous version.
    pub async fn save(&self, campaign: &Campaign) -> Result<()> {
        let path = self.record_path(&campaign.id)?;
        let body = serde_json::to_vec_pretty(campaign)?;
        tokio::fs::create_dir_all(self.campaigns_dir()).await?;
        tokio::fs::write(&path, body).await?;
        debug!(campaign_id = %campaign.id, status = %campaign.status.as_str(), "Campaign saved");
        Ok(())
    }

    /// Loads a campaign; unknown IDs are `CampaignNotFound`.
    pub async fn get(&self, id: &str) -> Result<Campaign> {
        let path = self.record_path(id)?;
        let body = match tokio::fs::read(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::CampaignNotFound(id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&body)?)
    }

    /// All campaigns, newest first. Unreadable records are skipped.
    pub async fn list_all(&self) -> Result<Vec<Campaign>> {
        let mut campaigns = Vec::new();
        let mut entries = match tokio::fs::read_dir(self.campaigns_dir()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(campaigns),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed = tokio::fs::read(&path)
                .await
                .map_err(Error::from)
                .and_then(|body| serde_json::from_slice::<Campaign>(&body).map_err(Error::from));
            match parsed {
                Ok(campaign) => campaigns.push(campaign),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable campaign record"),
            }
        }

        campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(campaigns)
    }

    /// Sets the status of a stored campaign and returns the updated record.
    pub async fn update_status(&self, id: &str, status: CampaignStatus) -> Result<Campaign> {
        let mut campaign = self.get(id).await?;
        let previous = campaign.status;
        campaign.status = status;
        self.save(&campaign).await?;
        info!(
            campaign_id = %id,
            from = %previous.as_str(),
            to = %status.as_str(),
            "Campaign status updated"
        );
        Ok(campaign)
    }
}

fn check_id(id: &str) -> Result<()> {
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::invalid_input(format!("invalid campaign id: {:?}", id)));
    }
    Ok(())
}
