//! UTM field handling.
//!
//! Values coming out of the submission store are normalized once, at
//! ingestion: blanks and the stringified `nan` marker become `None`.
//! Downstream stages only ever see `Option<String>`.

use serde::{Deserialize, Serialize};

/// Literal string upstream exports write in place of a missing value.
const MISSING_MARKER: &str = "nan";

/// Stringified empty ad-set ID; only meaningful for `utm_term`.
const EMPTY_ADSET_ID: &str = "None";

/// Opening marker of an unrendered template variable.
const PLACEHOLDER_OPEN: &str = "{{";
/// Closing marker of an unrendered template variable.
const PLACEHOLDER_CLOSE: &str = "}}";

/// Normalizes a raw UTM value.
///
/// Trims whitespace; empty strings and `nan` map to `None`. Other text,
/// including `None` and `null`, is a real value.
pub fn clean_field(raw: Option<&str>) -> Option<String> {
    let value = raw?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case(MISSING_MARKER) {
        return None;
    }
    Some(value.to_string())
}

/// True when the value carries an unresolved `{{...}}` template artifact.
pub fn is_placeholder(value: &str) -> bool {
    value.contains(PLACEHOLDER_OPEN) || value.contains(PLACEHOLDER_CLOSE)
}

/// The five UTM tracking parameters of a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmFields {
    pub source: Option<String>,
    pub medium: Option<String>,
    pub campaign: Option<String>,
    pub content: Option<String>,
    pub term: Option<String>,
}

impl UtmFields {
    /// Builds normalized fields from raw store values.
    pub fn from_raw(
        source: Option<&str>,
        medium: Option<&str>,
        campaign: Option<&str>,
        content: Option<&str>,
        term: Option<&str>,
    ) -> Self {
        Self {
            source: clean_field(source),
            medium: clean_field(medium),
            campaign: clean_field(campaign),
            content: clean_field(content),
            term: clean_field(term),
        }
    }

    fn values(&self) -> [Option<&str>; 5] {
        [
            self.source.as_deref(),
            self.medium.as_deref(),
            self.campaign.as_deref(),
            self.content.as_deref(),
            self.term.as_deref(),
        ]
    }

    /// True if at least one field holds a value.
    pub fn has_any(&self) -> bool {
        self.values().iter().any(Option::is_some)
    }

    /// True if any field holds a template placeholder artifact.
    pub fn has_placeholder(&self) -> bool {
        self.values().iter().flatten().any(|v| is_placeholder(v))
    }

    /// The ad-set ID carried in `utm_term`, if it holds one.
    pub fn adset_id(&self) -> Option<&str> {
        self.term
            .as_deref()
            .map(str::trim)
            .filter(|id| *id != EMPTY_ADSET_ID)
    }

    /// Empty fields (all `None`).
    pub fn cleared() -> Self {
        Self::default()
    }
}
