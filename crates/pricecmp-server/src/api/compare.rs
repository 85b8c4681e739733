use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use pricecmp_compare::{
    CacheKey, Comparator, CompareError, Comparison, Recommendation, SiteSummary,
};
use pricecmp_core::{ScoringWeights, SearchQuery};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

const MAX_RESULTS: usize = 20;

#[derive(Debug, Deserialize)]
pub(super) struct CompareParams {
    pub q: Option<String>,
    pub num: Option<usize>,
    /// Comma-separated site domains; all enabled sites when absent.
    pub site: Option<String>,
    pub category: Option<String>,
    pub price_weight: Option<f64>,
    pub rating_weight: Option<f64>,
    pub review_weight: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(super) struct CompareData {
    #[serde(flatten)]
    pub comparison: Comparison,
    pub recommendation: Option<Recommendation>,
    pub site_summaries: Vec<SiteSummary>,
    /// True when served from the query cache without refetching.
    pub cached: bool,
}

impl CompareData {
    fn new(comparison: Comparison, cached: bool) -> Self {
        Self {
            recommendation: comparison.recommendation(),
            site_summaries: comparison.site_summaries(),
            comparison,
            cached,
        }
    }
}

pub(super) async fn compare(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<CompareParams>,
) -> Result<Json<ApiResponse<CompareData>>, ApiError> {
    let text = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "bad_request",
                "query parameter `q` is required",
            )
        })?;

    let weights = resolve_weights(state.config.weights, &params)
        .map_err(|msg| ApiError::new(req_id.0.clone(), "bad_request", msg))?;

    let Some(backend) = state.backend.as_ref() else {
        return Err(ApiError::new(
            req_id.0,
            "upstream_unavailable",
            "no listing source is configured",
        ));
    };

    let sites = state.sites.resolve(&split_sites(params.site.as_deref()));
    let category = params
        .category
        .map(|c| c.trim().to_owned())
        .filter(|c| !c.is_empty());
    let query = SearchQuery::new(
        text,
        normalize_num(params.num, state.config.default_num_results),
    )
    .with_category(category);

    let key = CacheKey::new(&query, &sites, &weights);
    let hit = state.cache.lock().await.get(&key).cloned();
    if let Some(mut comparison) = hit {
        tracing::debug!(query = %query.text, "serving comparison from cache");
        // Keys ignore case and padding; echo this request's spelling.
        comparison.query = query;
        return Ok(Json(ApiResponse {
            data: CompareData::new(comparison, true),
            meta: ResponseMeta::new(req_id.0),
        }));
    }

    let comparator = Comparator::new(backend.adapters(&sites), weights, state.config.rating_policy);
    let comparison = comparator
        .compare(&query)
        .await
        .map_err(|e| map_compare_error(req_id.0.clone(), &e))?;

    tracing::info!(
        query = %query.text,
        records = comparison.records.len(),
        dropped = comparison.dropped_total(),
        "comparison completed"
    );
    state.cache.lock().await.put(key, comparison.clone());

    Ok(Json(ApiResponse {
        data: CompareData::new(comparison, false),
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn map_compare_error(request_id: String, error: &CompareError) -> ApiError {
    match error {
        CompareError::InvalidInput(_) | CompareError::NoSources => {
            ApiError::new(request_id, "bad_request", error.to_string())
        }
        CompareError::AllSourcesFailed { .. } => {
            tracing::error!(error = %error, "comparison failed");
            ApiError::new(request_id, "all_sources_failed", error.to_string())
        }
    }
}

fn normalize_num(num: Option<usize>, default: usize) -> usize {
    num.unwrap_or(default).clamp(1, MAX_RESULTS)
}

fn split_sites(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    })
    .unwrap_or_default()
}

/// Applies per-request weight overrides on top of the configured weights.
fn resolve_weights(
    base: ScoringWeights,
    params: &CompareParams,
) -> Result<ScoringWeights, String> {
    let pick = |label: &str, value: Option<f64>, fallback: f64| -> Result<f64, String> {
        match value {
            Some(v) if !v.is_finite() || v < 0.0 => {
                Err(format!("{label} must be a non-negative number, got {v}"))
            }
            Some(v) => Ok(v),
            None => Ok(fallback),
        }
    };

    Ok(ScoringWeights::new(
        pick("price_weight", params.price_weight, base.price)?,
        pick("rating_weight", params.rating_weight, base.rating)?,
        pick("review_weight", params.review_weight, base.reviews)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> CompareParams {
        CompareParams {
            q: Some("pixel".to_string()),
            num: None,
            site: None,
            category: None,
            price_weight: None,
            rating_weight: None,
            review_weight: None,
        }
    }

    #[test]
    fn normalize_num_applies_default_and_bounds() {
        assert_eq!(normalize_num(None, 5), 5);
        assert_eq!(normalize_num(Some(0), 5), 1);
        assert_eq!(normalize_num(Some(500), 5), MAX_RESULTS);
        assert_eq!(normalize_num(Some(3), 5), 3);
    }

    #[test]
    fn split_sites_trims_and_skips_blanks() {
        assert_eq!(
            split_sites(Some(" amazon.in, ,flipkart.com ")),
            vec!["amazon.in", "flipkart.com"]
        );
        assert!(split_sites(None).is_empty());
    }

    #[test]
    fn resolve_weights_overrides_only_given_fields() {
        let mut p = params();
        p.rating_weight = Some(0.7);
        let w = resolve_weights(ScoringWeights::default(), &p).expect("valid weights");
        assert_eq!(w, ScoringWeights::new(0.4, 0.7, 0.2));
    }

    #[test]
    fn resolve_weights_rejects_nan() {
        let mut p = params();
        p.review_weight = Some(f64::NAN);
        assert!(resolve_weights(ScoringWeights::default(), &p).is_err());
    }
}
