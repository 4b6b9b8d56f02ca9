//! Application state shared across handlers.

use std::sync::Arc;

use pipeline::{AttributionPipeline, PipelineConfig};
use store::{CampaignStore, StoreConnector};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Campaign records, uploads and results
    pub campaigns: CampaignStore,
    /// Submission store / ad catalog connector (MySQL in production, memory in tests)
    pub connector: Arc<dyn StoreConnector>,
    /// Pipeline tuning
    pub pipeline: PipelineConfig,
    /// Required API key; `None` leaves the API open
    pub api_key: Option<String>,
}

impl AppState {
    pub fn new(campaigns: CampaignStore, connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            campaigns,
            connector,
            pipeline: PipelineConfig::default(),
            api_key: None,
        }
    }

    pub fn with_pipeline_config(mut self, config: PipelineConfig) -> Self {
        self.pipeline = config;
        self
    }

    /// Requires `key` on campaign endpoints. Blank keys leave the API open.
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    /// A pipeline wired to this state's connector.
    pub fn pipeline(&self) -> AttributionPipeline {
        AttributionPipeline::new(self.connector.clone(), &self.pipeline)
    }
}
