use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Relative importance of each feature in the composite score.
///
/// Weights are expected to sum to `1.0`, but this is not enforced: callers
/// may pass any finite triple and the composite scales accordingly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub price: f64,
    pub rating: f64,
    pub reviews: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            price: 0.4,
            rating: 0.4,
            reviews: 0.2,
        }
    }
}

impl ScoringWeights {
    #[must_use]
    pub fn new(price: f64, rating: f64, reviews: f64) -> Self {
        Self {
            price,
            rating,
            reviews,
        }
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.price + self.rating + self.reviews
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.price.is_finite() && self.rating.is_finite() && self.reviews.is_finite()
    }

    /// Returns `true` when the weights sum to `1.0` within rounding error.
    #[must_use]
    pub fn is_unit_sum(&self) -> bool {
        (self.total() - 1.0).abs() < 1e-6
    }
}

/// Parses `"price,rating,reviews"`, e.g. `"0.5,0.3,0.2"`.
impl FromStr for ScoringWeights {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [price, rating, reviews] = parts.as_slice() else {
            return Err(format!(
                "expected three comma-separated weights (price,rating,reviews), got \"{s}\""
            ));
        };

        let parse = |label: &str, raw: &str| -> Result<f64, String> {
            let value = raw
                .parse::<f64>()
                .map_err(|e| format!("invalid {label} weight \"{raw}\": {e}"))?;
            if !value.is_finite() || value < 0.0 {
                return Err(format!(
                    "{label} weight must be a non-negative number, got {raw}"
                ));
            }
            Ok(value)
        };

        Ok(Self {
            price: parse("price", *price)?,
            rating: parse("rating", *rating)?,
            reviews: parse("reviews", *reviews)?,
        })
    }
}

/// How the normalizer treats rows that carry no rating at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingPolicy {
    /// Missing ratings become `0.0`.
    #[default]
    Lenient,
    /// Rows without a rating are dropped.
    Strict,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        let w = ScoringWeights::default();
        assert!(w.is_unit_sum());
        assert_eq!(w.price, 0.4);
        assert_eq!(w.reviews, 0.2);
    }

    #[test]
    fn parses_weight_triple() {
        let w: ScoringWeights = "0.5, 0.3, 0.2".parse().unwrap();
        assert_eq!(w, ScoringWeights::new(0.5, 0.3, 0.2));
    }

    #[test]
    fn rejects_wrong_arity() {
        let err = "0.5,0.5".parse::<ScoringWeights>().unwrap_err();
        assert!(err.contains("three comma-separated"), "got: {err}");
    }

    #[test]
    fn rejects_negative_weight() {
        let err = "0.5,-0.3,0.2".parse::<ScoringWeights>().unwrap_err();
        assert!(err.contains("rating weight"), "got: {err}");
    }

    #[test]
    fn non_unit_sum_is_detected() {
        assert!(!ScoringWeights::new(1.0, 1.0, 1.0).is_unit_sum());
    }

    #[test]
    fn rating_policy_defaults_to_lenient() {
        assert_eq!(RatingPolicy::default(), RatingPolicy::Lenient);
    }
}
