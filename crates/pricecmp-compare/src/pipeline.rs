//! Comparison pipeline orchestration.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;

use pricecmp_core::{DropReason, RatingPolicy, ScoredRecord, ScoringWeights, SearchQuery};
use pricecmp_scraper::{normalize_records, SourceAdapter};

use crate::error::{CompareError, SourceFailure};
use crate::scorer::{rank, score_records};
use crate::summary::{recommend, site_summaries, Recommendation, SiteSummary};

/// Per-source fetch outcome attached to a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub source: String,
    #[serde(flatten)]
    pub status: SourceStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    Ok { count: usize },
    Failed { error: String },
}

/// Ranked result of one query across every selected source.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub query: SearchQuery,
    pub generated_at: DateTime<Utc>,
    pub weights: ScoringWeights,
    /// Best first.
    pub records: Vec<ScoredRecord>,
    pub dropped: BTreeMap<DropReason, usize>,
    pub sources: Vec<SourceReport>,
}

impl Comparison {
    #[must_use]
    pub fn recommendation(&self) -> Option<Recommendation> {
        recommend(&self.records)
    }

    #[must_use]
    pub fn site_summaries(&self) -> Vec<SiteSummary> {
        site_summaries(&self.records)
    }

    #[must_use]
    pub fn dropped_total(&self) -> usize {
        self.dropped.values().sum()
    }
}

/// Runs one query through fetch, normalize, score and rank.
pub struct Comparator {
    adapters: Vec<Box<dyn SourceAdapter>>,
    weights: ScoringWeights,
    rating_policy: RatingPolicy,
}

impl Comparator {
    #[must_use]
    pub fn new(
        adapters: Vec<Box<dyn SourceAdapter>>,
        weights: ScoringWeights,
        rating_policy: RatingPolicy,
    ) -> Self {
        Self {
            adapters,
            weights,
            rating_policy,
        }
    }

    /// Compares listings for `query` across every adapter.
    ///
    /// 1. Fetch from all adapters concurrently, one attempt each.
    /// 2. Record a [`SourceReport`] per adapter; failures are logged and skipped.
    /// 3. Normalize the union of raw rows, tallying drops.
    /// 4. Score and rank whatever survived.
    ///
    /// A query where every row was dropped yields an empty comparison rather
    /// than an error.
    ///
    /// # Errors
    ///
    /// - [`CompareError::InvalidInput`] for blank query text, a zero result
    ///   count, or non-finite weights.
    /// - [`CompareError::NoSources`] when the comparator has no adapters.
    /// - [`CompareError::AllSourcesFailed`] when no adapter returned a result.
    pub async fn compare(&self, query: &SearchQuery) -> Result<Comparison, CompareError> {
        if query.text.trim().is_empty() {
            return Err(CompareError::InvalidInput("query text is empty".into()));
        }
        if query.num_results == 0 {
            return Err(CompareError::InvalidInput(
                "number of results must be at least 1".into(),
            ));
        }
        if !self.weights.is_finite() {
            return Err(CompareError::InvalidInput(
                "weights must be finite numbers".into(),
            ));
        }
        if self.adapters.is_empty() {
            return Err(CompareError::NoSources);
        }

        let outcomes = join_all(self.adapters.iter().map(|adapter| async move {
            (adapter.source(), adapter.fetch(query).await)
        }))
        .await;

        let mut raw = Vec::new();
        let mut sources = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();

        for (source, outcome) in outcomes {
            match outcome {
                Ok(rows) => {
                    tracing::debug!(source, count = rows.len(), "source fetch succeeded");
                    sources.push(SourceReport {
                        source: source.to_owned(),
                        status: SourceStatus::Ok { count: rows.len() },
                    });
                    raw.extend(rows);
                }
                Err(e) => {
                    tracing::warn!(
                        source,
                        query = %query.text,
                        error = %e,
                        "source fetch failed"
                    );
                    failures.push(SourceFailure {
                        source: source.to_owned(),
                        error: e.to_string(),
                    });
                    sources.push(SourceReport {
                        source: source.to_owned(),
                        status: SourceStatus::Failed {
                            error: e.to_string(),
                        },
                    });
                }
            }
        }

        if failures.len() == self.adapters.len() {
            return Err(CompareError::AllSourcesFailed { failures });
        }

        let report = normalize_records(raw, self.rating_policy);
        if report.dropped_total() > 0 {
            tracing::info!(
                query = %query.text,
                kept = report.records.len(),
                dropped = report.dropped_total(),
                "dropped listings during normalization"
            );
        }

        let records = if report.records.is_empty() {
            tracing::info!(query = %query.text, "no listings survived normalization");
            Vec::new()
        } else {
            rank(score_records(report.records, &self.weights)?)
        };

        Ok(Comparison {
            query: query.clone(),
            generated_at: Utc::now(),
            weights: self.weights,
            records,
            dropped: report.dropped,
            sources,
        })
    }
}
