//! Regex helpers that recover price, rating and review counts from listing
//! text.
//!
//! Search results rarely carry structured values, so the normalizer falls
//! back to these when a field is absent. Every helper returns `None` instead
//! of a zero placeholder when nothing usable is found.

use std::sync::LazyLock;

use regex::Regex;

/// Smallest amount accepted when scanning free text for a price. Filters out
/// storage sizes, model numbers and EMI instalments that look like money.
pub const MIN_TEXT_PRICE: f64 = 1000.0;

/// Currency amounts with thousands separators, most specific first.
static GROUPED_PRICE_RES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"[₹$€£]\s*\d+(?:,\d+)+(?:\.\d+)?").expect("valid symbol price regex"),
        Regex::new(r"INR\s*\d+(?:,\d+)+(?:\.\d+)?").expect("valid INR price regex"),
        Regex::new(r"Rs\.\s*\d+(?:,\d+)+(?:\.\d+)?").expect("valid Rs. price regex"),
    ]
});

/// Currency amounts written without separators; five or more digits, so
/// cashback and EMI figures such as `₹1500` are never taken for the price.
static BARE_PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[₹$€£]\s*\d{5,}(?:\.\d+)?").expect("valid bare price regex"));

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d.,]*").expect("valid number regex"));

static LABELLED_RATING_RES: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)(\d+\.\d+)\s*(?:stars?|★|rating|out of 5)")
            .expect("valid labelled rating regex"),
        Regex::new(r"(?i)Rating:\s*(\d+\.\d+)").expect("valid rating prefix regex"),
    ]
});

static BARE_DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d+\.\d+)\b").expect("valid decimal regex"));

// The leading class keeps "4.5 ratings" from reading as five reviews.
static REVIEWS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^\d.,])(\d+(?:,\d+)*)\s*(?:reviews?|ratings?)\b")
        .expect("valid reviews regex")
});

/// Finds the first currency amount of at least [`MIN_TEXT_PRICE`] in `text`
/// and returns it as displayed, e.g. `"₹ 1,29,999"`.
///
/// Amounts with thousands separators are preferred over bare digit runs.
#[must_use]
pub fn find_price(text: &str) -> Option<String> {
    let accept = |m: regex::Match<'_>| {
        parse_price(m.as_str())
            .filter(|value| *value >= MIN_TEXT_PRICE)
            .map(|_| m.as_str().to_owned())
    };

    GROUPED_PRICE_RES
        .iter()
        .find_map(|re| re.find_iter(text).find_map(accept))
        .or_else(|| BARE_PRICE_RE.find_iter(text).find_map(accept))
}

/// Parses the first number in a price string, tolerating currency symbols
/// and both `1,299.00` and `1.299,00` separator conventions.
///
/// When both separators appear the later one is the decimal point. A lone
/// comma followed by two or three digits groups thousands (`1,29,999`),
/// otherwise it is a decimal comma. Several dots are thousands separators.
#[must_use]
pub fn parse_price(text: &str) -> Option<f64> {
    let number = NUMBER_RE
        .find(text)?
        .as_str()
        .trim_end_matches(['.', ',']);

    let last_comma = number.rfind(',');
    let last_dot = number.rfind('.');

    let canonical = match (last_comma, last_dot) {
        (Some(comma), Some(dot)) if dot > comma => number.replace(',', ""),
        (Some(_), Some(_)) => number.replace('.', "").replace(',', "."),
        (Some(_), None) => {
            let tail = number.rsplit(',').next().unwrap_or_default();
            if tail.len() == 2 || tail.len() == 3 {
                number.replace(',', "")
            } else {
                number.replace(',', ".")
            }
        }
        (None, Some(_)) if number.matches('.').count() > 1 => number.replace('.', ""),
        _ => number.to_owned(),
    };

    canonical.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Finds a star rating in free text, e.g. `"4.5 out of 5"` or `"Rating: 4.2"`.
///
/// Falls back to the first bare decimal between 1 and 5.
#[must_use]
pub fn find_rating(text: &str) -> Option<f64> {
    LABELLED_RATING_RES
        .iter()
        .find_map(|re| {
            re.captures(text)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<f64>().ok())
        })
        .or_else(|| {
            BARE_DECIMAL_RE
                .captures_iter(text)
                .filter_map(|caps| caps.get(1)?.as_str().parse::<f64>().ok())
                .find(|rating| (1.0..=5.0).contains(rating))
        })
}

/// Finds a review count in free text, e.g. `"12,345 ratings"`.
#[must_use]
pub fn find_reviews(text: &str) -> Option<u64> {
    let caps = REVIEWS_RE.captures(text)?;
    parse_count(caps.get(1)?.as_str())
}

/// Parses an integer count written with optional thousands commas.
#[must_use]
pub fn parse_count(text: &str) -> Option<u64> {
    let digits: String = text.trim().chars().filter(|c| *c != ',').collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u64>().ok()
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
