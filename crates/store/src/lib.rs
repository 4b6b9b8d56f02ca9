//! External collaborators of the attribution pipeline.

pub mod campaigns;
pub mod client;
pub mod config;
pub mod connector;
pub mod health;
pub mod memory;

use std::sync::Arc;

pub use campaigns::{CampaignStore, RESULTS_FILE};
pub use client::*;
pub use config::*;
pub use connector::*;
pub use memory::*;

/// Builds the connector selected by the configuration.
pub fn connector_from_config(config: &DatabaseConfig) -> Arc<dyn StoreConnector> {
    if config.is_mock() {
        tracing::warn!("Database url is mock; using in-memory stores");
        Arc::new(MemoryConnector::new())
    } else {
        Arc::new(MySqlConnector::new(config.clone()))
    }
}
