//! Shared domain types and configuration for the product comparator.

pub mod app_config;
pub mod config;
pub mod records;
pub mod scoring;
pub mod sites;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use records::{
    DropReason, NormalizedRecord, RawRecord, RawValue, ScoredRecord, SearchQuery, SubScores,
};
pub use scoring::{RatingPolicy, ScoringWeights};
pub use sites::{load_sites, parse_sites, SiteConfig, SitesFile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sites file {path}: {source}")]
    SitesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sites file: {0}")]
    SitesFileParse(#[source] serde_yaml::Error),

    #[error("sites config validation failed: {0}")]
    Validation(String),
}
