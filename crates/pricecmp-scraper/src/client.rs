//! HTTP client for the `SerpAPI` Google search endpoint.

use std::time::Duration;

use reqwest::{Client, Url};

use pricecmp_core::config::DEFAULT_SERPAPI_BASE_URL;

use crate::error::ScraperError;
use crate::types::{OrganicResult, SearchResponse};

/// `SerpAPI` reports an empty result page through its `error` field.
const NO_RESULTS_ERROR: &str = "Google hasn't returned any results for this query.";

/// Client for site-scoped Google searches through `SerpAPI`.
///
/// Makes exactly one request per call: failures surface to the caller, which
/// reports them per source instead of retrying.
pub struct SerpApiClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl SerpApiClient {
    /// Creates a client pointed at the production `SerpAPI` endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ScraperError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_SERPAPI_BASE_URL)
    }

    /// Creates a client with a custom endpoint (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ScraperError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;

        let base_url = Url::parse(base_url).map_err(|e| ScraperError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Searches Google for `"{terms} price site:{domain}"` and returns at most
    /// `limit` organic results, in ranking order.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`] on HTTP 429.
    /// - [`ScraperError::NotFound`] on HTTP 404.
    /// - [`ScraperError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`ScraperError::Api`] when the body carries an `error` message.
    /// - [`ScraperError::Http`] on network failure or timeout.
    /// - [`ScraperError::Deserialize`] if the body is not the expected JSON.
    pub async fn search_site(
        &self,
        terms: &str,
        domain: &str,
        limit: usize,
    ) -> Result<Vec<OrganicResult>, ScraperError> {
        let url = self.search_url(terms, domain);
        // The request URL carries the API key; keep it out of error messages.
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(ScraperError::RateLimited { retry_after_secs });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ScraperError::NotFound {
                url: self.redacted(&url),
            });
        }

        let body = response.text().await.map_err(reqwest::Error::without_url)?;

        if !status.is_success() {
            // SerpAPI explains 4xx rejections (bad key, exhausted plan) in the body.
            if let Ok(SearchResponse {
                error: Some(message),
                ..
            }) = serde_json::from_str::<SearchResponse>(&body)
            {
                return Err(ScraperError::Api(message));
            }
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.redacted(&url),
            });
        }

        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| ScraperError::Deserialize {
                context: format!("search results for site:{domain}"),
                source: e,
            })?;

        match parsed.error {
            Some(message) if message != NO_RESULTS_ERROR => Err(ScraperError::Api(message)),
            _ => {
                let mut results = parsed.organic_results;
                results.truncate(limit);
                Ok(results)
            }
        }
    }

    /// Builds the search URL with percent-encoded query parameters.
    fn search_url(&self, terms: &str, domain: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("engine", "google")
            .append_pair("q", &format!("{} price site:{domain}", terms.trim()))
            .append_pair("api_key", &self.api_key);
        url
    }

    /// Renders a request URL for error messages with the API key masked.
    fn redacted(&self, url: &Url) -> String {
        if self.api_key.is_empty() {
            return url.to_string();
        }
        url.as_str().replace(&self.api_key, "[redacted]")
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
