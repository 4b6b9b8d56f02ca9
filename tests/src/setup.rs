//! Common test setup functions.

use std::sync::Arc;

use api::{router, state::AppState};
use axum::Router;
use pipeline::{AttributionPipeline, PipelineConfig};
use store::{CampaignStore, StoreConnector};
use tempfile::TempDir;

use crate::mocks::MockConnector;

/// API key used by `TestContext::with_api_key`.
pub const TEST_API_KEY: &str = "test-key-123";

/// Test context with mock stores and a temporary data directory.
///
/// Uses the real Axum router with all layers; the stores are swapped for
/// `MockConnector`, which implements the same `StoreConnector` trait.
pub struct TestContext {
    pub data_dir: TempDir,
    pub connector: MockConnector,
    pub campaigns: CampaignStore,
    pub router: Router,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::build(None).await
    }

    /// Context whose campaign endpoints require `TEST_API_KEY`.
    pub async fn with_api_key() -> Self {
        Self::build(Some(TEST_API_KEY.to_string())).await
    }

    async fn build(api_key: Option<String>) -> Self {
        let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let campaigns = CampaignStore::new(data_dir.path());
        campaigns
            .init()
            .await
            .expect("Failed to initialize campaign store");

        let connector = MockConnector::new();
        let state = AppState::new(
            campaigns.clone(),
            Arc::new(connector.clone()) as Arc<dyn StoreConnector>,
        )
        .with_pipeline_config(small_pipeline_config())
        .with_api_key(api_key);

        Self {
            data_dir,
            connector,
            campaigns,
            router: router(state),
        }
    }

    /// A pipeline over the context's mock stores.
    pub fn pipeline(&self) -> AttributionPipeline {
        pipeline_for(&self.connector)
    }
}

/// Pipeline over a mock connector with a small worker pool.
pub fn pipeline_for(connector: &MockConnector) -> AttributionPipeline {
    AttributionPipeline::new(Arc::new(connector.clone()), &small_pipeline_config())
}

fn small_pipeline_config() -> PipelineConfig {
    PipelineConfig {
        lookup_concurrency: 4,
        adset_cache_capacity: 100,
    }
}
