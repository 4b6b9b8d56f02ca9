//! Attribution categories.

use serde::{Deserialize, Serialize};

use crate::records::RecordStatus;

/// `utm_source` values (normalized) that identify Meta advertising.
pub const META_SOURCES: [&str; 4] = ["fb", "ig", "facebook", "instagram"];

/// Final attribution label for a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    NoRecord,
    Empty,
    AdMeta,
    Organic,
    Unknown,
}

impl Category {
    /// All categories in report order.
    pub const ALL: [Category; 5] = [
        Self::NoRecord,
        Self::Empty,
        Self::AdMeta,
        Self::Organic,
        Self::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoRecord => "NO_RECORD",
            Self::Empty => "EMPTY",
            Self::AdMeta => "AD_META",
            Self::Organic => "ORGANIC",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Parses a label produced by `as_str`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == label)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True if the source names a Meta placement.
pub fn is_meta_source(source: &str) -> bool {
    let normalized = source.trim().to_lowercase();
    META_SOURCES.contains(&normalized.as_str())
}

/// Assigns a category from the record status and UTM source.
///
/// Pure function: the same inputs always produce the same category.
/// `Unknown` is reserved for statuses outside the closed set and is never
/// produced for a well-formed `RecordStatus`.
pub fn categorize(status: RecordStatus, utm_source: Option<&str>) -> Category {
    match status {
        RecordStatus::NoRecord => Category::NoRecord,
        RecordStatus::Empty => Category::Empty,
        RecordStatus::UtmPresent => match utm_source {
            Some(source) if is_meta_source(source) => Category::AdMeta,
            _ => Category::Organic,
        },
    }
}

/// Count and share of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
    /// Percentage of the categorized table's row count.
    pub percentage: f64,
}

/// Frequency table over a categorized table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub total: usize,
    /// Categories that occur at least once, in `Category::ALL` order.
    pub categories: Vec<CategoryCount>,
}

impl CategorySummary {
    /// Builds the summary from a sequence of category labels.
    pub fn from_categories<I>(categories: I) -> Self
    where
        I: IntoIterator<Item = Category>,
    {
        let mut counts = [0usize; Category::ALL.len()];
        let mut total = 0;
        for category in categories {
            counts[category as usize] += 1;
            total += 1;
        }

        let categories = Category::ALL
            .into_iter()
            .zip(counts)
            .filter(|(_, count)| *count > 0)
            .map(|(category, count)| CategoryCount {
                category,
                count,
                percentage: count as f64 / total as f64 * 100.0,
            })
            .collect();

        Self { total, categories }
    }

    /// Count for a category (0 when absent).
    pub fn count(&self, category: Category) -> usize {
        self.get(category).map(|c| c.count).unwrap_or(0)
    }

    /// Percentage for a category (0.0 when absent).
    pub fn percentage(&self, category: Category) -> f64 {
        self.get(category).map(|c| c.percentage).unwrap_or(0.0)
    }

    fn get(&self, category: Category) -> Option<&CategoryCount> {
        self.categories.iter().find(|c| c.category == category)
    }
}
