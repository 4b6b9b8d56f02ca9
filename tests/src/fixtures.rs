//! Test fixtures and record builders.

use attribution_core::{DateWindow, Submission, UtmFields};
use chrono::{NaiveDate, NaiveDateTime};

/// Window used across the end-to-end tests: January 2024.
pub fn january() -> DateWindow {
    DateWindow::parse("2024-01-01", "2024-01-31").unwrap()
}

/// Timestamp on a January 2024 day.
pub fn jan(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

/// Builder for UTM fields.
#[derive(Debug, Clone, Default)]
pub struct Utm {
    source: Option<&'static str>,
    medium: Option<&'static str>,
    campaign: Option<&'static str>,
    content: Option<&'static str>,
    term: Option<&'static str>,
}

impl Utm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Typical Meta ad click.
    pub fn meta(source: &'static str, adset_id: &'static str) -> Self {
        Self::new()
            .source(source)
            .medium("paid_social")
            .campaign("Winter Sale")
            .content("Carousel A")
            .term(adset_id)
    }

    pub fn source(mut self, v: &'static str) -> Self {
        self.source = Some(v);
        self
    }

    pub fn medium(mut self, v: &'static str) -> Self {
        self.medium = Some(v);
        self
    }

    pub fn campaign(mut self, v: &'static str) -> Self {
        self.campaign = Some(v);
        self
    }

    pub fn content(mut self, v: &'static str) -> Self {
        self.content = Some(v);
        self
    }

    pub fn term(mut self, v: &'static str) -> Self {
        self.term = Some(v);
        self
    }

    pub fn build(&self) -> UtmFields {
        UtmFields::from_raw(self.source, self.medium, self.campaign, self.content, self.term)
    }
}

/// A submission for `email` at `created_at`.
pub fn submission(email: &str, created_at: NaiveDateTime, utm: Utm) -> Submission {
    Submission {
        email: email.to_string(),
        created_at,
        utm: utm.build(),
    }
}

/// Owned email list.
pub fn emails(list: &[&str]) -> Vec<String> {
    list.iter().map(|e| e.to_string()).collect()
}

/// Customer CSV with the given email header and rows.
pub fn customer_csv(email_header: &str, emails: &[&str]) -> String {
    let mut csv = format!("name,{}\n", email_header);
    for (i, email) in emails.iter().enumerate() {
        csv.push_str(&format!("Customer {},{}\n", i + 1, email));
    }
    csv
}
