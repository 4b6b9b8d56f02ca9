//! Uploaded customer list parsing.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::records::email_key;

/// Header names recognized as the email column, in priority order.
pub const EMAIL_COLUMN_CANDIDATES: [&str; 6] =
    ["email", "Email", "EMAIL", "MAİL ADRESİ", "Mail", "mail"];

const UTF8_BOM: char = '\u{feff}';

/// The email column of an uploaded customer table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerTable {
    /// Header of the column the emails were read from.
    pub email_column: String,
    /// Number of data rows in the file (including blank emails).
    pub row_count: usize,
    /// Non-blank email cells in file order, untrimmed duplicates included.
    pub emails: Vec<String>,
}

impl CustomerTable {
    /// Reads a CSV customer table from a file.
    pub fn from_path(path: impl AsRef<Path>, preferred_column: Option<&str>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, preferred_column)
    }

    /// Reads a CSV customer table.
    ///
    /// The email column is `preferred_column` when present, otherwise the
    /// first header matching `EMAIL_COLUMN_CANDIDATES`.
    pub fn from_reader<R: Read>(reader: R, preferred_column: Option<&str>) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers: Vec<String> = csv
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches(UTF8_BOM).trim().to_string())
            .collect();

        let index = find_email_column(&headers, preferred_column).ok_or_else(|| {
            Error::MissingEmailColumn {
                columns: headers.clone(),
            }
        })?;

        let mut row_count = 0;
        let mut emails = Vec::new();
        for row in csv.records() {
            let row = row?;
            row_count += 1;
            if let Some(value) = row.get(index) {
                if !value.trim().is_empty() {
                    emails.push(value.to_string());
                }
            }
        }

        Ok(Self {
            email_column: headers[index].clone(),
            row_count,
            emails,
        })
    }

    /// Distinct emails (trimmed), deduplicated case-insensitively.
    /// The first spelling seen is kept for display.
    pub fn unique_emails(&self) -> Vec<String> {
        dedupe_emails(&self.emails)
    }

    /// Rows minus distinct emails.
    pub fn duplicate_count(&self) -> usize {
        self.row_count.saturating_sub(self.unique_emails().len())
    }
}

/// Trims and deduplicates emails on their normalized key, dropping blanks.
pub fn dedupe_emails<S: AsRef<str>>(emails: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    emails
        .iter()
        .map(|e| e.as_ref().trim())
        .filter(|e| !e.is_empty())
        .filter(|e| seen.insert(email_key(e)))
        .map(str::to_string)
        .collect()
}

fn find_email_column(headers: &[String], preferred: Option<&str>) -> Option<usize> {
    let position = |name: &str| headers.iter().position(|h| h == name);

    preferred
        .and_then(position)
        .or_else(|| EMAIL_COLUMN_CANDIDATES.iter().find_map(|c| position(c)))
}
