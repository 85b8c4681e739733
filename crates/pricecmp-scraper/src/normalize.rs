//! Record normalization from [`RawRecord`] to [`NormalizedRecord`].
//!
//! Text parsing is delegated to [`crate::extract`]; this module decides which
//! field feeds each value and which rows are dropped.

use std::collections::BTreeMap;

use pricecmp_core::{DropReason, NormalizedRecord, RatingPolicy, RawRecord, RawValue};

use crate::extract::{find_price, find_rating, find_reviews, parse_count, parse_price};

/// Output of a normalization pass: surviving rows plus a per-reason tally of
/// the rows that were discarded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeReport {
    pub records: Vec<NormalizedRecord>,
    pub dropped: BTreeMap<DropReason, usize>,
}

impl NormalizeReport {
    #[must_use]
    pub fn dropped_total(&self) -> usize {
        self.dropped.values().sum()
    }
}

/// Normalizes a batch of raw rows, keeping input order.
///
/// Rows failing validation are counted under their [`DropReason`] and never
/// abort the batch.
#[must_use]
pub fn normalize_records(raw: Vec<RawRecord>, policy: RatingPolicy) -> NormalizeReport {
    let mut report = NormalizeReport::default();

    for row in raw {
        let source = row.source.clone();
        match normalize_record(row, policy) {
            Ok(record) => report.records.push(record),
            Err(reason) => {
                tracing::debug!(source = %source, reason = %reason, "dropping listing");
                *report.dropped.entry(reason).or_insert(0) += 1;
            }
        }
    }

    report
}

/// Validates and coerces one raw row.
///
/// # Errors
///
/// Returns the [`DropReason`] describing the first check the row failed.
pub fn normalize_record(
    raw: RawRecord,
    policy: RatingPolicy,
) -> Result<NormalizedRecord, DropReason> {
    let name = raw
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(DropReason::MissingName)?
        .to_owned();

    let (price, raw_price) = resolve_price(&raw)?;
    let rating = resolve_rating(&raw, policy)?;
    let reviews = resolve_reviews(&raw)?;

    Ok(NormalizedRecord {
        name,
        price,
        raw_price,
        rating,
        reviews,
        image_ref: raw.image_url.filter(|s| !s.trim().is_empty()),
        link: raw.link.filter(|s| !s.trim().is_empty()),
        source: raw.source,
    })
}

/// Price field, then the first plausible amount in the snippet, then in the
/// title. A zero price is a placeholder and counts as missing.
fn resolve_price(raw: &RawRecord) -> Result<(f64, String), DropReason> {
    let (value, display) = match raw.price.as_ref().filter(|v| !v.is_placeholder()) {
        Some(RawValue::Number(n)) => (Some(*n), n.to_string()),
        Some(RawValue::Text(text)) => (parse_price(text), text.trim().to_owned()),
        None => {
            let found = raw
                .snippet
                .as_deref()
                .and_then(find_price)
                .or_else(|| raw.title.as_deref().and_then(find_price))
                .ok_or(DropReason::MissingPrice)?;
            (parse_price(&found), found)
        }
    };

    match value {
        None => Err(DropReason::InvalidPrice),
        Some(p) if !p.is_finite() || p < 0.0 => Err(DropReason::InvalidPrice),
        Some(p) if p == 0.0 => Err(DropReason::MissingPrice),
        Some(p) => Ok((p, display)),
    }
}

fn resolve_rating(raw: &RawRecord, policy: RatingPolicy) -> Result<f64, DropReason> {
    let rating = match raw.rating.as_ref().filter(|v| !v.is_placeholder()) {
        Some(RawValue::Number(n)) => Some(*n),
        Some(RawValue::Text(text)) => Some(
            text.trim()
                .parse::<f64>()
                .ok()
                .or_else(|| find_rating(text))
                .ok_or(DropReason::InvalidRating)?,
        ),
        None => raw.snippet.as_deref().and_then(find_rating),
    };

    match rating {
        Some(r) if r.is_finite() && (0.0..=5.0).contains(&r) => Ok(r),
        Some(_) => Err(DropReason::InvalidRating),
        None => match policy {
            RatingPolicy::Lenient => Ok(0.0),
            RatingPolicy::Strict => Err(DropReason::MissingRating),
        },
    }
}

fn resolve_reviews(raw: &RawRecord) -> Result<u64, DropReason> {
    match raw.reviews.as_ref().filter(|v| !v.is_placeholder()) {
        Some(RawValue::Number(n)) => count_from_f64(*n).ok_or(DropReason::InvalidReviews),
        Some(RawValue::Text(text)) => parse_count(text)
            .or_else(|| find_reviews(text))
            .ok_or(DropReason::InvalidReviews),
        None => Ok(raw.snippet.as_deref().and_then(find_reviews).unwrap_or(0)),
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn count_from_f64(n: f64) -> Option<u64> {
    // u64::MAX as f64 rounds up, so compare strictly below it.
    if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n < u64::MAX as f64 {
        Some(n as u64)
    } else {
        None
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
