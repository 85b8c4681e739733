//! Batch-relative composite scoring.
//!
//! Each feature is min-max scaled across the batch, so a score only means
//! something next to the other records of the same query.

use pricecmp_core::{NormalizedRecord, ScoredRecord, ScoringWeights, SubScores};

use crate::error::CompareError;

/// Observed `[min, max]` of one feature across a batch.
#[derive(Debug, Clone, Copy)]
struct Range {
    min: f64,
    max: f64,
}

impl Range {
    fn of(values: impl Iterator<Item = f64>) -> Self {
        values.fold(
            Self {
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
            },
            |r, v| Self {
                min: r.min.min(v),
                max: r.max.max(v),
            },
        )
    }

    /// Position of `value` in the range; `1.0` when the range is empty.
    fn scale(self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span > 0.0 {
            (value - self.min) / span
        } else {
            1.0
        }
    }

    /// Like [`Range::scale`] but lower values score higher.
    fn scale_inverse(self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span > 0.0 {
            1.0 - (value - self.min) / span
        } else {
            1.0
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn reviews_f64(record: &NormalizedRecord) -> f64 {
    record.reviews as f64
}

/// Scores a batch of records, preserving input order.
///
/// Price is scaled inversely (cheapest is `1.0`); rating and review count are
/// scaled directly. A feature with no spread scores `1.0` for every record,
/// and a single-record batch scores `1.0` on every feature.
///
/// # Errors
///
/// Returns [`CompareError::InvalidInput`] for an empty batch or non-finite
/// weights.
pub fn score_records(
    records: Vec<NormalizedRecord>,
    weights: &ScoringWeights,
) -> Result<Vec<ScoredRecord>, CompareError> {
    if records.is_empty() {
        return Err(CompareError::InvalidInput(
            "cannot score an empty batch".into(),
        ));
    }

    if !weights.is_finite() {
        return Err(CompareError::InvalidInput(format!(
            "weights must be finite numbers, got {weights:?}"
        )));
    }

    if !weights.is_unit_sum() {
        tracing::warn!(
            price = weights.price,
            rating = weights.rating,
            reviews = weights.reviews,
            total = weights.total(),
            "scoring weights do not sum to 1.0"
        );
    }

    if let [record] = records.as_slice() {
        let sub_scores = SubScores {
            price: 1.0,
            rating: 1.0,
            reviews: 1.0,
        };
        return Ok(vec![ScoredRecord {
            score: composite(&sub_scores, weights),
            sub_scores,
            record: record.clone(),
        }]);
    }

    let price = Range::of(records.iter().map(|r| r.price));
    let rating = Range::of(records.iter().map(|r| r.rating));
    let reviews = Range::of(records.iter().map(reviews_f64));

    Ok(records
        .into_iter()
        .map(|record| {
            let sub_scores = SubScores {
                price: price.scale_inverse(record.price),
                rating: rating.scale(record.rating),
                reviews: reviews.scale(reviews_f64(&record)),
            };
            ScoredRecord {
                score: composite(&sub_scores, weights),
                sub_scores,
                record,
            }
        })
        .collect())
}

fn composite(sub: &SubScores, weights: &ScoringWeights) -> f64 {
    weights.price * sub.price + weights.rating * sub.rating + weights.reviews * sub.reviews
}

/// Orders records by score, best first. The sort is stable: equal scores keep
/// their batch order.
#[must_use]
pub fn rank(mut scored: Vec<ScoredRecord>) -> Vec<ScoredRecord> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

#[cfg(test)]
#[path = "scorer_test.rs"]
mod tests;
