//! MySQL-backed submission store and ad catalog.

use std::time::Duration;

use async_trait::async_trait;
use attribution_core::{
    DateWindow, Error, Result, StoreErrorCode, Submission, UtmFields,
};
use chrono::NaiveDateTime;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use tracing::{debug, error, info};

use crate::config::DatabaseConfig;
use crate::connector::{AdCatalog, StoreConnector, SubmissionStore};

/// Opens MySQL pools from a `DatabaseConfig`.
#[derive(Debug, Clone)]
pub struct MySqlConnector {
    config: DatabaseConfig,
}

impl MySqlConnector {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    async fn connect(&self, code: StoreErrorCode) -> Result<MySqlPool> {
        let pool = MySqlPoolOptions::new()
            .max_connections(self.config.max_connections)
            .acquire_timeout(Duration::from_secs(self.config.connect_timeout_secs))
            .connect(&self.config.url)
            .await
            .map_err(|e| {
                error!(
                    url = %self.config.redacted_url(),
                    error = %e,
                    "Database connection failed"
                );
                Error::unavailable(code, format!("database unreachable: {}", e))
            })?;

        info!(
            url = %self.config.redacted_url(),
            max_connections = self.config.max_connections,
            "Connected to MySQL"
        );
        Ok(pool)
    }
}

#[async_trait]
impl StoreConnector for MySqlConnector {
    async fn open_submission_store(&self) -> Result<Box<dyn SubmissionStore>> {
        let pool = self
            .connect(StoreErrorCode::SubmissionStoreUnavailable)
            .await?;
        Ok(Box::new(MySqlSubmissionStore::new(
            pool,
            &self.config.submissions_table,
        )))
    }

    async fn open_ad_catalog(&self) -> Result<Box<dyn AdCatalog>> {
        let pool = self.connect(StoreErrorCode::AdCatalogUnavailable).await?;
        Ok(Box::new(MySqlAdCatalog::new(pool, &self.config.adsets_table)))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubmissionRow {
    email: Option<String>,
    created_at: NaiveDateTime,
    utm_source: Option<String>,
    utm_medium: Option<String>,
    utm_campaign: Option<String>,
    utm_content: Option<String>,
    utm_term: Option<String>,
}

impl SubmissionRow {
    fn into_submission(self) -> Submission {
        Submission {
            email: self.email.unwrap_or_default(),
            created_at: self.created_at,
            utm: UtmFields::from_raw(
                self.utm_source.as_deref(),
                self.utm_medium.as_deref(),
                self.utm_campaign.as_deref(),
                self.utm_content.as_deref(),
                self.utm_term.as_deref(),
            ),
        }
    }
}

/// Submission store over the form submissions table.
pub struct MySqlSubmissionStore {
    pool: MySqlPool,
    query: String,
}

impl MySqlSubmissionStore {
    pub fn new(pool: MySqlPool, table: &str) -> Self {
        let query = format!(
            r#"
            SELECT email, created_at, utm_source, utm_medium, utm_campaign, utm_content, utm_term
            FROM {}
            WHERE LOWER(TRIM(email)) = LOWER(TRIM(?))
              AND created_at >= ?
              AND created_at <= ?
            ORDER BY created_at ASC
            "#,
            table
        );
        Self { pool, query }
    }
}

#[async_trait]
impl SubmissionStore for MySqlSubmissionStore {
    async fn find_submissions(&self, email: &str, window: &DateWindow) -> Result<Vec<Submission>> {
        let rows: Vec<SubmissionRow> = sqlx::query_as(&self.query)
            .bind(email)
            .bind(window.lower_bound())
            .bind(window.upper_bound())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::query(format!("submission lookup failed: {}", e)))?;

        debug!(email = %email, rows = rows.len(), "Fetched submissions");
        Ok(rows.into_iter().map(SubmissionRow::into_submission).collect())
    }

    async fn close(&self) {
        self.pool.close().await;
        debug!("Submission store connection closed");
    }
}

/// Ad catalog over the Meta ad-sets table.
pub struct MySqlAdCatalog {
    pool: MySqlPool,
    query: String,
}

impl MySqlAdCatalog {
    pub fn new(pool: MySqlPool, table: &str) -> Self {
        let query = format!(
            "SELECT name AS adset_name FROM {} WHERE adset_id = ? LIMIT 1",
            table
        );
        Self { pool, query }
    }
}

#[async_trait]
impl AdCatalog for MySqlAdCatalog {
    async fn find_adset_name(&self, adset_id: &str) -> Result<Option<String>> {
        let name: Option<Option<String>> = sqlx::query_scalar(&self.query)
            .bind(adset_id.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::query(format!("ad-set lookup failed: {}", e)))?;

        Ok(name.flatten())
    }

    async fn close(&self) {
        self.pool.close().await;
        debug!("Ad catalog connection closed");
    }
}
