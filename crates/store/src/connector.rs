//! Collaborator interfaces consumed by the pipeline.
//!
//! A connector opens one store per pipeline stage; the stage closes it when
//! it finishes, including on error.

use async_trait::async_trait;
use attribution_core::{DateWindow, Result, Submission};

/// Form submissions keyed by email.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// All submissions whose email matches `email` (trimmed, case-insensitive)
    /// within the window, oldest first.
    async fn find_submissions(&self, email: &str, window: &DateWindow) -> Result<Vec<Submission>>;

    /// Releases the underlying connection.
    async fn close(&self);
}

/// Meta ad-set names keyed by ad-set ID.
#[async_trait]
pub trait AdCatalog: Send + Sync {
    /// Name of the ad-set with this ID, if any.
    async fn find_adset_name(&self, adset_id: &str) -> Result<Option<String>>;

    /// Releases the underlying connection.
    async fn close(&self);
}

/// Opens collaborator connections.
///
/// Opening fails with a precondition error (`Error::Unavailable`) when the
/// backing store cannot be reached.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn open_submission_store(&self) -> Result<Box<dyn SubmissionStore>>;

    async fn open_ad_catalog(&self) -> Result<Box<dyn AdCatalog>>;
}
