//! Marketing Attribution Engine
//!
//! Attributes uploaded customer lists to marketing channels:
//! - Collects UTM-tagged form submissions per email within a date window
//! - Resolves one authoritative submission per customer
//! - Enriches Meta ad traffic with ad-set names
//! - Categorizes, validates and exports the results

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};

use api::{router, AppState};
use pipeline::PipelineConfig;
use store::{connector_from_config, CampaignStore, DatabaseConfig};
use telemetry::init_tracing_from_env;

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct AppConfig {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    /// Required API key for the campaign endpoints; empty leaves them open
    #[serde(default)]
    api_key: Option<String>,

    /// Campaign records, uploads and results
    #[serde(default = "default_data_dir")]
    data_dir: PathBuf,

    #[serde(default)]
    database: DatabaseConfig,

    #[serde(default)]
    pipeline: PipelineConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_key: None,
            data_dir: default_data_dir(),
            database: DatabaseConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting Attribution Engine v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    info!(
        database = %config.database.redacted_url(),
        data_dir = %config.data_dir.display(),
        lookup_concurrency = config.pipeline.lookup_concurrency,
        auth = config.api_key.is_some(),
        "Loaded configuration"
    );

    let campaigns = CampaignStore::new(&config.data_dir);
    campaigns
        .init()
        .await
        .context("Failed to initialize data directory")?;

    let connector = connector_from_config(&config.database);

    // Probe both stores; analyses fail fast later if they stay unreachable
    if store::health::check_connection(connector.as_ref()).await {
        info!("Submission store connection: healthy");
    } else {
        warn!("Submission store connection: unhealthy");
    }

    let state = AppState::new(campaigns, connector)
        .with_pipeline_config(config.pipeline.clone())
        .with_api_key(config.api_key.clone());

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<AppConfig> {
    let config = config::Config::builder()
        .add_source(config::Config::try_from(&AppConfig::default())?)
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("ATTRIBUTION")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: AppConfig = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // The config crate's nested parsing doesn't work reliably with underscored field names
    if let Ok(url) = std::env::var("ATTRIBUTION_DATABASE_URL") {
        config.database.url = url;
    }
    if let Ok(max) = std::env::var("ATTRIBUTION_DATABASE_MAX_CONNECTIONS") {
        config.database.max_connections = max
            .parse()
            .context("ATTRIBUTION_DATABASE_MAX_CONNECTIONS must be a number")?;
    }
    if let Ok(table) = std::env::var("ATTRIBUTION_DATABASE_SUBMISSIONS_TABLE") {
        config.database.submissions_table = table;
    }
    if let Ok(table) = std::env::var("ATTRIBUTION_DATABASE_ADSETS_TABLE") {
        config.database.adsets_table = table;
    }
    if let Ok(concurrency) = std::env::var("ATTRIBUTION_PIPELINE_LOOKUP_CONCURRENCY") {
        config.pipeline.lookup_concurrency = concurrency
            .parse()
            .context("ATTRIBUTION_PIPELINE_LOOKUP_CONCURRENCY must be a number")?;
    }
    if let Ok(key) = std::env::var("ATTRIBUTION_API_KEY") {
        config.api_key = Some(key);
    }
    if let Ok(dir) = std::env::var("ATTRIBUTION_DATA_DIR") {
        config.data_dir = PathBuf::from(dir);
    }

    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
