//! Unified error types for the attribution engine.
//!
//! Error codes:
//! - STORE_001-002: External collaborator unreachable (precondition failures)
//! - INPUT_001-002: Malformed input (customer file, date window)
//! - CAMPAIGN_001: Campaign record not found

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Precondition error codes: an external collaborator could not be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    /// STORE_001: Submission store unreachable
    SubmissionStoreUnavailable,
    /// STORE_002: Ad catalog unreachable
    AdCatalogUnavailable,
}

impl StoreErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::SubmissionStoreUnavailable => "STORE_001",
            Self::AdCatalogUnavailable => "STORE_002",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        503
    }
}

/// Input error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputErrorCode {
    /// INPUT_001: No recognizable email column in the customer file
    MissingEmailColumn,
    /// INPUT_002: Invalid input (bad date window, unreadable upload, ...)
    InvalidInput,
}

impl InputErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingEmailColumn => "INPUT_001",
            Self::InvalidInput => "INPUT_002",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        400
    }
}

/// Unified error type for the attribution engine.
#[derive(Debug, Error)]
pub enum Error {
    /// An external store could not be reached when opening a connection.
    /// Fatal for the whole pipeline run.
    #[error("[{code}] {message}")]
    Unavailable {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    /// Malformed input rejected before the pipeline starts.
    #[error("[{code}] {message}")]
    Input {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    #[error("no email column found (columns: {})", columns.join(", "))]
    MissingEmailColumn { columns: Vec<String> },

    #[error("campaign not found: {0}")]
    CampaignNotFound(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a precondition error for an unreachable collaborator.
    pub fn unavailable(code: StoreErrorCode, msg: impl Into<String>) -> Self {
        Self::Unavailable {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    /// Create an input error with code.
    pub fn input(code: InputErrorCode, msg: impl Into<String>) -> Self {
        Self::Input {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::input(InputErrorCode::InvalidInput, msg)
    }

    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True for connection failures that must abort the whole run.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Unavailable { http_status, .. } => *http_status,
            Self::Input { http_status, .. } => *http_status,
            Self::MissingEmailColumn { .. } => 400,
            Self::CampaignNotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::Csv(_) => 400,
            Self::Query(_) => 500,
            Self::Io(_) => 500,
            Self::Serialization(_) => 500,
            Self::Internal(_) => 500,
        }
    }

    /// Get the error code string.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable { code, .. } => code,
            Self::Input { code, .. } => code,
            Self::MissingEmailColumn { .. } => InputErrorCode::MissingEmailColumn.code(),
            Self::CampaignNotFound(_) => "CAMPAIGN_001",
            Self::Validation(_) | Self::Csv(_) => InputErrorCode::InvalidInput.code(),
            Self::Query(_) | Self::Io(_) | Self::Serialization(_) | Self::Internal(_) => {
                "INTERNAL_001"
            }
        }
    }
}
