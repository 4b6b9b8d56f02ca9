//! API routes.

pub mod campaigns;
pub mod health;

use attribution_core::limits::MAX_UPLOAD_SIZE_BYTES;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/campaigns",
            post(campaigns::create_handler).get(campaigns::list_handler),
        )
        .route("/api/campaigns/:id", get(campaigns::get_handler))
        .route("/api/campaigns/:id/analyze", post(campaigns::analyze_handler))
        .route("/api/campaigns/:id/files", get(campaigns::files_handler))
        .route(
            "/api/campaigns/:id/download/:filename",
            get(campaigns::download_handler),
        )
        .route(
            "/api/campaigns/:id/preview/:filename",
            get(campaigns::preview_handler),
        )
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_SIZE_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
