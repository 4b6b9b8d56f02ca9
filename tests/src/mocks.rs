//! Mock collaborators for testing.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use attribution_core::{
    email_key, DateWindow, Error, Result, StoreErrorCode, Submission,
};
use parking_lot::Mutex;
use store::{
    AdCatalog, InMemoryAdCatalog, InMemorySubmissionStore, StoreConnector, SubmissionStore,
};

#[derive(Debug, Default)]
struct MockState {
    fail_submission_store: bool,
    fail_ad_catalog: bool,
    failing_emails: HashSet<String>,
    failing_adsets: HashSet<String>,
}

#[derive(Debug, Default)]
struct Calls {
    submission_store_opens: AtomicUsize,
    ad_catalog_opens: AtomicUsize,
    closes: AtomicUsize,
    adset_lookups: AtomicUsize,
}

/// Connector over in-memory data with failure injection and call counting.
///
/// Implements the same `StoreConnector` trait as the MySQL connector, so the
/// pipeline runs its production code paths against it.
#[derive(Clone, Default)]
pub struct MockConnector {
    pub submissions: InMemorySubmissionStore,
    pub catalog: InMemoryAdCatalog,
    state: Arc<Mutex<MockState>>,
    calls: Arc<Calls>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_submission(&self, submission: Submission) {
        self.submissions.insert(submission);
    }

    pub fn add_adset(&self, adset_id: &str, name: &str) {
        self.catalog.insert(adset_id, name);
    }

    /// Opening the submission store fails with `STORE_001`.
    pub fn set_submission_store_down(&self, down: bool) {
        self.state.lock().fail_submission_store = down;
    }

    /// Opening the ad catalog fails with `STORE_002`.
    pub fn set_ad_catalog_down(&self, down: bool) {
        self.state.lock().fail_ad_catalog = down;
    }

    /// Lookups for this email fail with a query error.
    pub fn fail_email(&self, email: &str) {
        self.state.lock().failing_emails.insert(email_key(email));
    }

    /// Lookups for this ad-set ID fail with a query error.
    pub fn fail_adset(&self, adset_id: &str) {
        self.state.lock().failing_adsets.insert(adset_id.trim().to_string());
    }

    pub fn submission_store_opens(&self) -> usize {
        self.calls.submission_store_opens.load(Ordering::SeqCst)
    }

    pub fn ad_catalog_opens(&self) -> usize {
        self.calls.ad_catalog_opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.calls.closes.load(Ordering::SeqCst)
    }

    /// Catalog lookups that reached the store.
    pub fn adset_lookups(&self) -> usize {
        self.calls.adset_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoreConnector for MockConnector {
    async fn open_submission_store(&self) -> Result<Box<dyn SubmissionStore>> {
        self.calls.submission_store_opens.fetch_add(1, Ordering::SeqCst);
        if self.state.lock().fail_submission_store {
            return Err(Error::unavailable(
                StoreErrorCode::SubmissionStoreUnavailable,
                "mock submission store down",
            ));
        }
        Ok(Box::new(MockSubmissionStore {
            inner: self.submissions.clone(),
            state: self.state.clone(),
            calls: self.calls.clone(),
        }))
    }

    async fn open_ad_catalog(&self) -> Result<Box<dyn AdCatalog>> {
        self.calls.ad_catalog_opens.fetch_add(1, Ordering::SeqCst);
        if self.state.lock().fail_ad_catalog {
            return Err(Error::unavailable(
                StoreErrorCode::AdCatalogUnavailable,
                "mock ad catalog down",
            ));
        }
        Ok(Box::new(MockAdCatalog {
            inner: self.catalog.clone(),
            state: self.state.clone(),
            calls: self.calls.clone(),
        }))
    }
}

struct MockSubmissionStore {
    inner: InMemorySubmissionStore,
    state: Arc<Mutex<MockState>>,
    calls: Arc<Calls>,
}

#[async_trait]
impl SubmissionStore for MockSubmissionStore {
    async fn find_submissions(&self, email: &str, window: &DateWindow) -> Result<Vec<Submission>> {
        if self.state.lock().failing_emails.contains(&email_key(email)) {
            return Err(Error::query("mock lookup failure"));
        }
        self.inner.find_submissions(email, window).await
    }

    async fn close(&self) {
        self.calls.closes.fetch_add(1, Ordering::SeqCst);
    }
}

struct MockAdCatalog {
    inner: InMemoryAdCatalog,
    state: Arc<Mutex<MockState>>,
    calls: Arc<Calls>,
}

#[async_trait]
impl AdCatalog for MockAdCatalog {
    async fn find_adset_name(&self, adset_id: &str) -> Result<Option<String>> {
        self.calls.adset_lookups.fetch_add(1, Ordering::SeqCst);
        if self.state.lock().failing_adsets.contains(adset_id.trim()) {
            return Err(Error::query("mock catalog failure"));
        }
        self.inner.find_adset_name(adset_id).await
    }

    async fn close(&self) {
        self.calls.closes.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_connector_failures() {
        let connector = MockConnector::new();
        assert!(connector.open_submission_store().await.is_ok());

        connector.set_submission_store_down(true);
        let err = connector.open_submission_store().await.err().unwrap();
        assert!(err.is_precondition());
        assert_eq!(err.error_code(), "STORE_001");
        assert_eq!(connector.submission_store_opens(), 2);
    }

    #[tokio::test]
    async fn test_mock_lookup_failure() {
        let connector = MockConnector::new();
        connector.fail_adset("42");
        let catalog = connector.open_ad_catalog().await.unwrap();

        assert!(catalog.find_adset_name("42").await.is_err());
        assert_eq!(catalog.find_adset_name("43").await.unwrap(), None);
        assert_eq!(connector.adset_lookups(), 2);

        catalog.close().await;
        assert_eq!(connector.closes(), 1);
    }
}
