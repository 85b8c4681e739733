//! `SerpAPI` Google-engine response types.
//!
//! Only the fields the adapters read are modelled. Organic results carry no
//! structured price in most cases; when Google detects product markup the
//! values surface under `rich_snippet.top.detected_extensions` instead, as
//! numbers (`"rating": 4.4`, `"reviews": 1532`) or occasionally as strings
//! (`"price": "₹79,900"`). Those leaves are kept as raw JSON values and
//! converted to [`RawValue`] at the adapter boundary.

use pricecmp_core::RawValue;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub organic_results: Vec<OrganicResult>,
    /// Set by the API instead of results when the request is rejected, e.g.
    /// `"Invalid API key."`. An empty result page also reports here.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganicResult {
    pub position: Option<u32>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub snippet: Option<String>,
    pub price: Option<Value>,
    pub rating: Option<Value>,
    pub reviews: Option<Value>,
    pub thumbnail: Option<String>,
    pub image: Option<String>,
    pub rich_snippet: Option<RichSnippet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RichSnippet {
    pub top: Option<RichSnippetSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RichSnippetSection {
    #[serde(default)]
    pub detected_extensions: serde_json::Map<String, Value>,
}

impl OrganicResult {
    /// Looks up a key in `rich_snippet.top.detected_extensions`.
    #[must_use]
    pub fn detected_extension(&self, key: &str) -> Option<&Value> {
        self.rich_snippet
            .as_ref()?
            .top
            .as_ref()?
            .detected_extensions
            .get(key)
    }
}

/// Converts a JSON leaf into a [`RawValue`], ignoring nulls, booleans and
/// nested structures.
#[must_use]
pub fn raw_value(value: &Value) -> Option<RawValue> {
    match value {
        Value::Number(n) => n.as_f64().map(RawValue::Number),
        Value::String(s) => Some(RawValue::Text(s.clone())),
        _ => None,
    }
}
