//! Record shapes flowing through the attribution pipeline.
//!
//! Each stage consumes the previous stage's table and produces a new one:
//! `CustomerRecord` (collector) → `ResolvedRecord` (resolver) →
//! `EnrichedRecord` (enricher) → `CategorizedRecord` (categorizer).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::utm::UtmFields;

/// Attribution status assigned during collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    /// No submission found for the email in the window.
    NoRecord,
    /// Submission found, no usable UTM data.
    Empty,
    /// Submission carries at least one UTM value.
    UtmPresent,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoRecord => "NO_RECORD",
            Self::Empty => "EMPTY",
            Self::UtmPresent => "UTM_PRESENT",
        }
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A form submission as returned by the submission store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub email: String,
    pub created_at: NaiveDateTime,
    pub utm: UtmFields,
}

/// One collected row per submission (or a sentinel row when none exist).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// Input email, trimmed, original case.
    pub email: String,
    /// Number of submissions found for this email in the window.
    pub submission_count: usize,
    pub status: RecordStatus,
    pub submitted_at: Option<NaiveDateTime>,
    pub utm: UtmFields,
}

impl CustomerRecord {
    /// Sentinel row for an email without submissions.
    pub fn no_record(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            submission_count: 0,
            status: RecordStatus::NoRecord,
            submitted_at: None,
            utm: UtmFields::default(),
        }
    }

    /// Row for one submission of `email`.
    pub fn from_submission(
        email: impl Into<String>,
        submission_count: usize,
        submission: &Submission,
    ) -> Self {
        let status = if submission.utm.has_any() {
            RecordStatus::UtmPresent
        } else {
            RecordStatus::Empty
        };

        Self {
            email: email.into(),
            submission_count,
            status,
            submitted_at: Some(submission.created_at),
            utm: submission.utm.clone(),
        }
    }

    /// A usable attribution touchpoint: UTM data present and free of
    /// template artifacts.
    pub fn is_valid_attribution(&self) -> bool {
        self.status == RecordStatus::UtmPresent && !self.utm.has_placeholder()
    }

    /// Downgrades the row to `EMPTY`, dropping all UTM values.
    /// Email, timestamp and submission count are kept.
    pub fn downgraded(mut self) -> Self {
        self.status = RecordStatus::Empty;
        self.utm = UtmFields::cleared();
        self
    }
}

/// The single authoritative record per email chosen by the resolver.
pub type ResolvedRecord = CustomerRecord;

/// Resolved record with ad metadata attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub record: ResolvedRecord,
    /// Copied from `utm_campaign`.
    pub campaign_name: Option<String>,
    /// Copied from `utm_content`.
    pub ad_name: Option<String>,
    /// Ad-set name from the ad catalog, keyed by `utm_term`.
    pub adset_name: Option<String>,
}

impl EnrichedRecord {
    /// Copies campaign/ad names from the UTM fields; the ad-set name starts empty.
    pub fn from_resolved(record: ResolvedRecord) -> Self {
        Self {
            campaign_name: record.utm.campaign.clone(),
            ad_name: record.utm.content.clone(),
            adset_name: None,
            record,
        }
    }

    /// The ad-set identifier to look up, if this row qualifies.
    pub fn adset_id(&self) -> Option<&str> {
        if self.record.status != RecordStatus::UtmPresent {
            return None;
        }
        self.record.utm.term.as_deref()
    }
}

/// Final output row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedRecord {
    pub category: Category,
    #[serde(flatten)]
    pub enriched: EnrichedRecord,
}

impl CategorizedRecord {
    pub fn email(&self) -> &str {
        &self.enriched.record.email
    }

    pub fn status(&self) -> RecordStatus {
        self.enriched.record.status
    }

    pub fn utm(&self) -> &UtmFields {
        &self.enriched.record.utm
    }

    pub fn submitted_at(&self) -> Option<NaiveDateTime> {
        self.enriched.record.submitted_at
    }

    pub fn adset_name(&self) -> Option<&str> {
        self.enriched.adset_name.as_deref()
    }
}

/// Normalized matching key for an email: trimmed and lowercased.
pub fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}
