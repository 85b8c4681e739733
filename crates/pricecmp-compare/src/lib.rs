//! Scoring, ranking and the end-to-end comparison pipeline.

pub mod cache;
pub mod error;
pub mod pipeline;
pub mod scorer;
pub mod summary;

pub use cache::{CacheKey, QueryCache};
pub use error::{CompareError, SourceFailure};
pub use pipeline::{Comparator, Comparison, SourceReport, SourceStatus};
pub use scorer::{rank, score_records};
pub use summary::{recommend, site_summaries, Recommendation, SiteSummary, Strength};
