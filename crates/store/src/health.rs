//! Store health checks.

use attribution_core::Result;
use telemetry::health;
use tracing::{debug, error};

use crate::connector::StoreConnector;

/// Probes both collaborators and records the outcome in the health registry.
///
/// Returns true when the submission store is reachable.
pub async fn check_connection(connector: &dyn StoreConnector) -> bool {
    let submissions = match connector.open_submission_store().await {
        Ok(store) => {
            store.close().await;
            debug!("Submission store healthy");
            health().submission_store.set_healthy();
            true
        }
        Err(e) => {
            error!(error = %e, "Submission store health check failed");
            health().submission_store.set_unhealthy(e.to_string());
            false
        }
    };

    match connector.open_ad_catalog().await {
        Ok(catalog) => {
            catalog.close().await;
            debug!("Ad catalog healthy");
            health().ad_catalog.set_healthy();
        }
        Err(e) => {
            error!(error = %e, "Ad catalog health check failed");
            health().ad_catalog.set_unhealthy(e.to_string());
        }
    }

    submissions
}

/// Records the outcome of a connection attempt made by a pipeline stage.
pub fn record_submission_store<T>(result: &Result<T>) {
    match result {
        Ok(_) => health().submission_store.set_healthy(),
        Err(e) => health().submission_store.set_unhealthy(e.to_string()),
    }
}

/// Records the outcome of an ad catalog connection attempt.
pub fn record_ad_catalog<T>(result: &Result<T>) {
    match result {
        Ok(_) => health().ad_catalog.set_healthy(),
        Err(e) => health().ad_catalog.set_unhealthy(e.to_string()),
    }
}
