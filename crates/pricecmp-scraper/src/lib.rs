//! Listing retrieval and normalization: the `SerpAPI` client, per-site source
//! adapters, text extraction helpers and the record normalizer.

pub mod adapter;
pub mod client;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod types;

pub use adapter::{organic_to_raw, read_fixture, Backend, FixtureAdapter, SerpSiteAdapter, SourceAdapter};
pub use client::SerpApiClient;
pub use error::ScraperError;
pub use normalize::{normalize_record, normalize_records, NormalizeReport};
pub use types::{OrganicResult, SearchResponse};
