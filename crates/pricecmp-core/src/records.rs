use std::fmt;

use serde::{Deserialize, Serialize};

/// A field value as a source exposes it: either already numeric or a display
/// string such as `"₹1,29,999"` or `"4.5 out of 5"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Returns `true` for empty text and for the `0` placeholder sources use
    /// when they have no value to report.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        match self {
            RawValue::Number(n) => *n == 0.0,
            RawValue::Text(s) => {
                let trimmed = s.trim();
                trimmed.is_empty() || trimmed == "0"
            }
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(n) => write!(f, "{n}"),
            RawValue::Text(s) => f.write_str(s),
        }
    }
}

/// One listing as returned by a source adapter, before validation.
///
/// Adapters map their wire shapes into this struct at the boundary; nothing
/// downstream of the normalizer sees it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Platform tag, e.g. `"Amazon India"`.
    pub source: String,
    pub title: Option<String>,
    pub price: Option<RawValue>,
    pub rating: Option<RawValue>,
    pub reviews: Option<RawValue>,
    /// Free text accompanying the listing; price, rating and review count are
    /// recovered from it when the structured fields are absent.
    pub snippet: Option<String>,
    pub image_url: Option<String>,
    pub link: Option<String>,
}

/// A validated listing with numeric price, rating and review count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub name: String,
    /// Non-negative price in the listing's currency.
    pub price: f64,
    /// Price text as the source displayed it, e.g. `"₹ 79,900"`.
    pub raw_price: String,
    /// Star rating in `[0, 5]`.
    pub rating: f64,
    pub reviews: u64,
    pub image_ref: Option<String>,
    pub link: Option<String>,
    pub source: String,
}

/// Per-feature sub-scores in `[0, 1]`, relative to one batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub price: f64,
    pub rating: f64,
    pub reviews: f64,
}

/// A [`NormalizedRecord`] with its batch-relative composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub record: NormalizedRecord,
    pub sub_scores: SubScores,
    pub score: f64,
}

/// Why the normalizer discarded a raw row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    MissingName,
    MissingPrice,
    InvalidPrice,
    MissingRating,
    InvalidRating,
    InvalidReviews,
}

impl DropReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DropReason::MissingName => "missing_name",
            DropReason::MissingPrice => "missing_price",
            DropReason::InvalidPrice => "invalid_price",
            DropReason::MissingRating => "missing_rating",
            DropReason::InvalidRating => "invalid_rating",
            DropReason::InvalidReviews => "invalid_reviews",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user search: free text plus optional filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    /// Maximum listings to take from each source.
    pub num_results: usize,
    pub category: Option<String>,
}

impl SearchQuery {
    #[must_use]
    pub fn new(text: impl Into<String>, num_results: usize) -> Self {
        Self {
            text: text.into(),
            num_results,
            category: None,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category.filter(|c| !c.trim().is_empty());
        self
    }

    /// Query text with the category appended, as sent to search backends.
    #[must_use]
    pub fn search_terms(&self) -> String {
        match &self.category {
            Some(category) => format!("{} {}", self.text.trim(), category.trim()),
            None => self.text.trim().to_owned(),
        }
    }
}
