use std::net::SocketAddr;
use std::path::PathBuf;

use crate::scoring::{RatingPolicy, ScoringWeights};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub sites_path: PathBuf,
    /// When set, listings are read from this JSON file instead of the search API.
    pub fixture_path: Option<PathBuf>,
    pub serpapi_key: Option<String>,
    pub serpapi_base_url: String,
    pub default_num_results: usize,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub cache_ttl_secs: u64,
    pub weights: ScoringWeights,
    pub rating_policy: RatingPolicy,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("sites_path", &self.sites_path)
            .field("fixture_path", &self.fixture_path)
            .field(
                "serpapi_key",
                &self.serpapi_key.as_ref().map(|_| "[redacted]"),
            )
            .field("serpapi_base_url", &self.serpapi_base_url)
            .field("default_num_results", &self.default_num_results)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("weights", &self.weights)
            .field("rating_policy", &self.rating_policy)
            .finish()
    }
}
