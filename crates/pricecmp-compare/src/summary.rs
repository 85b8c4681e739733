//! Read-only views over ranked records for tables and charts.

use serde::Serialize;

use pricecmp_core::ScoredRecord;

/// How clearly the top record beats the runner-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    /// Score gap above `0.2`.
    Strong,
    /// Score gap above `0.1`.
    Good,
    /// Any positive gap up to `0.1`.
    Slight,
    /// Top two records score the same.
    Tie,
    /// Only one record was compared.
    Sole,
}

impl Strength {
    /// Thresholds are compared with a small tolerance so a gap that is
    /// exactly `0.2` on paper does not flip on rounding noise.
    #[must_use]
    pub fn from_gap(gap: Option<f64>) -> Self {
        const EPS: f64 = 1e-9;
        match gap {
            None => Strength::Sole,
            Some(g) if g > 0.2 + EPS => Strength::Strong,
            Some(g) if g > 0.1 + EPS => Strength::Good,
            Some(g) if g > EPS => Strength::Slight,
            Some(_) => Strength::Tie,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Strength::Strong => "strong",
            Strength::Good => "good",
            Strength::Slight => "slight",
            Strength::Tie => "tie",
            Strength::Sole => "sole",
        }
    }
}

impl std::fmt::Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub best: ScoredRecord,
    /// Score difference to the second-ranked record, if there is one.
    pub gap: Option<f64>,
    pub strength: Strength,
}

/// Picks the top record of an already ranked list.
#[must_use]
pub fn recommend(ranked: &[ScoredRecord]) -> Option<Recommendation> {
    let best = ranked.first()?;
    let gap = ranked.get(1).map(|second| best.score - second.score);
    Some(Recommendation {
        best: best.clone(),
        gap,
        strength: Strength::from_gap(gap),
    })
}

/// Per-source aggregates behind the price, rating, reviews and score charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteSummary {
    pub source: String,
    pub count: usize,
    pub avg_price: f64,
    pub avg_rating: f64,
    pub avg_reviews: f64,
    pub avg_score: f64,
    pub best_score: f64,
}

/// Groups records by source, in order of each source's first appearance.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn site_summaries(records: &[ScoredRecord]) -> Vec<SiteSummary> {
    let mut order: Vec<&str> = Vec::new();
    for r in records {
        if !order.contains(&r.record.source.as_str()) {
            order.push(&r.record.source);
        }
    }

    order
        .into_iter()
        .map(|source| {
            let group: Vec<&ScoredRecord> = records
                .iter()
                .filter(|r| r.record.source == source)
                .collect();
            let n = group.len() as f64;
            let avg = |f: fn(&ScoredRecord) -> f64| group.iter().map(|r| f(r)).sum::<f64>() / n;

            SiteSummary {
                source: source.to_owned(),
                count: group.len(),
                avg_price: avg(|r| r.record.price),
                avg_rating: avg(|r| r.record.rating),
                avg_reviews: avg(|r| r.record.reviews as f64),
                avg_score: avg(|r| r.score),
                best_score: group
                    .iter()
                    .map(|r| r.score)
                    .fold(f64::NEG_INFINITY, f64::max),
            }
        })
        .collect()
}
