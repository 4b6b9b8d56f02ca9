//! In-memory stores for development mode and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use attribution_core::{email_key, DateWindow, Result, Submission};
use parking_lot::RwLock;

use crate::connector::{AdCatalog, StoreConnector, SubmissionStore};

/// Submissions held in memory, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct InMemorySubmissionStore {
    rows: Arc<RwLock<Vec<Submission>>>,
}

impl InMemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, submission: Submission) {
        self.rows.write().push(submission);
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

#[async_trait]
impl SubmissionStore for InMemorySubmissionStore {
    async fn find_submissions(&self, email: &str, window: &DateWindow) -> Result<Vec<Submission>> {
        let key = email_key(email);
        let mut found: Vec<Submission> = self
            .rows
            .read()
            .iter()
            .filter(|s| email_key(&s.email) == key && window.contains(s.created_at))
            .cloned()
            .collect();
        found.sort_by_key(|s| s.created_at);
        Ok(found)
    }

    async fn close(&self) {}
}

/// Ad-set names held in memory, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAdCatalog {
    adsets: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryAdCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, adset_id: impl Into<String>, name: impl Into<String>) {
        let adset_id: String = adset_id.into();
        self.adsets
            .write()
            .insert(adset_id.trim().to_string(), name.into());
    }
}

#[async_trait]
impl AdCatalog for InMemoryAdCatalog {
    async fn find_adset_name(&self, adset_id: &str) -> Result<Option<String>> {
        Ok(self.adsets.read().get(adset_id.trim()).cloned())
    }

    async fn close(&self) {}
}

/// Connector handing out the shared in-memory stores.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    pub submissions: InMemorySubmissionStore,
    pub catalog: InMemoryAdCatalog,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoreConnector for MemoryConnector {
    async fn open_submission_store(&self) -> Result<Box<dyn SubmissionStore>> {
        Ok(Box::new(self.submissions.clone()))
    }

    async fn open_ad_catalog(&self) -> Result<Box<dyn AdCatalog>> {
        Ok(Box::new(self.catalog.clone()))
    }
}
