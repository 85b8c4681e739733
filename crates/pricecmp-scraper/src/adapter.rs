//! Source adapters: one per site, each turning a [`SearchQuery`] into raw
//! listings.
//!
//! Wire shapes stop here. Everything an adapter returns is a [`RawRecord`]
//! tagged with the site's display name.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use pricecmp_core::{AppConfig, RawRecord, SearchQuery, SiteConfig};

use crate::client::SerpApiClient;
use crate::error::ScraperError;
use crate::types::{raw_value, OrganicResult};

/// Fetches raw listings for a query from one source.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Display tag stamped on every record this adapter returns.
    fn source(&self) -> &str;

    /// Fetches at most `query.num_results` listings. One attempt, no retries.
    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<RawRecord>, ScraperError>;
}

/// Searches one site through `SerpAPI`.
pub struct SerpSiteAdapter {
    client: Arc<SerpApiClient>,
    site: SiteConfig,
}

impl SerpSiteAdapter {
    #[must_use]
    pub fn new(client: Arc<SerpApiClient>, site: SiteConfig) -> Self {
        Self { client, site }
    }
}

#[async_trait]
impl SourceAdapter for SerpSiteAdapter {
    fn source(&self) -> &str {
        &self.site.name
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<RawRecord>, ScraperError> {
        let results = self
            .client
            .search_site(&query.search_terms(), &self.site.domain, query.num_results)
            .await?;

        tracing::debug!(
            source = %self.site.name,
            count = results.len(),
            "received organic results"
        );

        Ok(results
            .into_iter()
            .map(|result| organic_to_raw(result, &self.site.name))
            .collect())
    }
}

/// Maps one organic search result into a [`RawRecord`].
///
/// Top-level `price`, `rating` and `reviews` win; the rich-snippet detected
/// extensions fill whichever are missing or zero. Text fallbacks are left to
/// the normalizer, which sees the snippet.
#[must_use]
pub fn organic_to_raw(result: OrganicResult, source: &str) -> RawRecord {
    let field = |top: Option<&serde_json::Value>, key: &str| {
        top.and_then(raw_value)
            .filter(|v| !v.is_placeholder())
            .or_else(|| result.detected_extension(key).and_then(raw_value))
    };

    let price = field(result.price.as_ref(), "price");
    let rating = field(result.rating.as_ref(), "rating");
    let reviews = field(result.reviews.as_ref(), "reviews");

    let image_url = non_empty(result.thumbnail).or_else(|| non_empty(result.image));

    RawRecord {
        source: source.to_owned(),
        title: result.title,
        price,
        rating,
        reviews,
        snippet: result.snippet,
        image_url,
        link: result.link,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Serves listings for one site from a JSON fixture file.
///
/// The file holds a JSON array of [`RawRecord`]s for any number of sites;
/// this adapter returns the rows whose `source` matches its site name.
pub struct FixtureAdapter {
    path: PathBuf,
    site: SiteConfig,
}

impl FixtureAdapter {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, site: SiteConfig) -> Self {
        Self {
            path: path.into(),
            site,
        }
    }
}

#[async_trait]
impl SourceAdapter for FixtureAdapter {
    fn source(&self) -> &str {
        &self.site.name
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<RawRecord>, ScraperError> {
        let records = read_fixture(&self.path).await?;
        Ok(records
            .into_iter()
            .filter(|r| r.source.eq_ignore_ascii_case(&self.site.name))
            .take(query.num_results)
            .collect())
    }
}

/// Reads a fixture file of raw records.
///
/// # Errors
///
/// Returns [`ScraperError::FixtureIo`] if the file cannot be read, or
/// [`ScraperError::Deserialize`] if it is not a JSON array of records.
pub async fn read_fixture(path: &Path) -> Result<Vec<RawRecord>, ScraperError> {
    let content =
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ScraperError::FixtureIo {
                path: path.display().to_string(),
                source: e,
            })?;

    serde_json::from_str(&content).map_err(|e| ScraperError::Deserialize {
        context: format!("fixture {}", path.display()),
        source: e,
    })
}

/// Where listings come from for a process: live search or a fixture file.
///
/// Built once at startup and asked for a fresh adapter set per comparison,
/// since each comparison may target a different list of sites.
#[derive(Clone)]
pub enum Backend {
    Serp(Arc<SerpApiClient>),
    Fixture(PathBuf),
}

impl Backend {
    /// Chooses the backend from configuration. A fixture path takes precedence
    /// over the API key.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::MissingApiKey`] when neither a fixture path nor
    /// an API key is configured, or any client construction error.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        if let Some(path) = &config.fixture_path {
            tracing::info!(path = %path.display(), "serving listings from fixture file");
            return Ok(Self::Fixture(path.clone()));
        }

        let api_key = config
            .serpapi_key
            .as_deref()
            .ok_or(ScraperError::MissingApiKey)?;

        let client = SerpApiClient::with_base_url(
            api_key,
            config.request_timeout_secs,
            &config.user_agent,
            &config.serpapi_base_url,
        )?;

        Ok(Self::Serp(Arc::new(client)))
    }

    /// Builds one adapter per site, preserving order.
    #[must_use]
    pub fn adapters(&self, sites: &[SiteConfig]) -> Vec<Box<dyn SourceAdapter>> {
        sites
            .iter()
            .cloned()
            .map(|site| -> Box<dyn SourceAdapter> {
                match self {
                    Self::Serp(client) => Box::new(SerpSiteAdapter::new(Arc::clone(client), site)),
                    Self::Fixture(path) => Box::new(FixtureAdapter::new(path.clone(), site)),
                }
            })
            .collect()
    }

    #[must_use]
    pub fn is_fixture(&self) -> bool {
        matches!(self, Self::Fixture(_))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use pricecmp_core::RawValue;

    fn organic(value: serde_json::Value) -> OrganicResult {
        serde_json::from_value(value).expect("valid organic result")
    }

    #[test]
    fn organic_to_raw_prefers_top_level_fields() {
        let result = organic(json!({
            "title": "Apple iPhone 15 (128 GB) - Black",
            "link": "https://www.amazon.in/dp/B0CHX1W1XY",
            "snippet": "4.4 out of 5 stars",
            "price": "₹69,900",
            "rating": 4.5,
            "reviews": 1200,
            "thumbnail": "https://img.example/iphone.jpg"
        }));

        let raw = organic_to_raw(result, "Amazon India");
        assert_eq!(raw.source, "Amazon India");
        assert_eq!(raw.price, Some(RawValue::Text("₹69,900".to_string())));
        assert_eq!(raw.rating, Some(RawValue::Number(4.5)));
        assert_eq!(raw.reviews, Some(RawValue::Number(1200.0)));
        assert_eq!(raw.image_url.as_deref(), Some("https://img.example/iphone.jpg"));
    }

    #[test]
    fn organic_to_raw_falls_back_to_detected_extensions() {
        let result = organic(json!({
            "title": "Pixel 8",
            "rating": 0,
            "rich_snippet": {
                "top": {
                    "detected_extensions": { "rating": 4.3, "reviews": 5321, "price": 52999 }
                }
            }
        }));

        let raw = organic_to_raw(result, "Flipkart");
        assert_eq!(raw.rating, Some(RawValue::Number(4.3)));
        assert_eq!(raw.reviews, Some(RawValue::Number(5321.0)));
        assert_eq!(raw.price, Some(RawValue::Number(52999.0)));
    }

    #[test]
    fn organic_to_raw_uses_image_when_thumbnail_blank() {
        let result = organic(json!({
            "title": "Galaxy S24",
            "thumbnail": "",
            "image": "https://img.example/s24.png"
        }));

        let raw = organic_to_raw(result, "Snapdeal");
        assert_eq!(raw.image_url.as_deref(), Some("https://img.example/s24.png"));
        assert!(raw.price.is_none());
    }

    fn config_with(vars: &[(&str, &str)]) -> AppConfig {
        pricecmp_core::config::build_app_config(|key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
                .ok_or(std::env::VarError::NotPresent)
        })
        .expect("valid config")
    }

    #[test]
    fn backend_requires_key_without_fixture() {
        let result = Backend::from_config(&config_with(&[]));
        assert!(matches!(result, Err(ScraperError::MissingApiKey)));
    }

    #[test]
    fn backend_prefers_fixture_over_key() {
        let config = config_with(&[
            ("SERPAPI_API_KEY", "k"),
            ("PRICECMP_FIXTURE_PATH", "./config/fixtures/phones.json"),
        ]);
        let backend = Backend::from_config(&config).expect("fixture backend");
        assert!(backend.is_fixture());
    }

    #[test]
    fn backend_builds_one_adapter_per_site_in_order() {
        let config = config_with(&[("SERPAPI_API_KEY", "k")]);
        let backend = Backend::from_config(&config).expect("serp backend");
        let sites = vec![
            SiteConfig::ad_hoc("amazon.in"),
            SiteConfig::ad_hoc("flipkart.com"),
        ];
        let adapters = backend.adapters(&sites);
        let tags: Vec<&str> = adapters.iter().map(|a| a.source()).collect();
        assert_eq!(tags, vec!["amazon.in", "flipkart.com"]);
    }
}
