//! Time-bounded memo of comparison results, owned by whoever runs queries.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use pricecmp_core::{ScoringWeights, SearchQuery, SiteConfig};

/// Identity of a comparison request.
///
/// Two requests share a key when they would fetch and score the same batch:
/// query text compared case-insensitively, the same sites in any order, and
/// identical weights.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    query: String,
    num_results: usize,
    sites: Vec<String>,
    category: Option<String>,
    weights: [u64; 3],
}

impl CacheKey {
    #[must_use]
    pub fn new(query: &SearchQuery, sites: &[SiteConfig], weights: &ScoringWeights) -> Self {
        let mut sites: Vec<String> = sites.iter().map(|s| s.domain.to_ascii_lowercase()).collect();
        sites.sort();
        sites.dedup();

        Self {
            query: query.text.trim().to_lowercase(),
            num_results: query.num_results,
            sites,
            category: query
                .category
                .as_deref()
                .map(|c| c.trim().to_lowercase()),
            weights: [
                weights.price.to_bits(),
                weights.rating.to_bits(),
                weights.reviews.to_bits(),
            ],
        }
    }
}

/// Map from [`CacheKey`] to a value that expires `ttl` after insertion.
///
/// Expired entries are invisible to [`QueryCache::get`] and are removed by
/// [`QueryCache::purge_expired`] or by being overwritten.
#[derive(Debug)]
pub struct QueryCache<V> {
    ttl: Duration,
    entries: HashMap<CacheKey, (Instant, V)>,
}

impl<V> QueryCache<V> {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the live value for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<&V> {
        self.get_at(key, Instant::now())
    }

    pub fn put(&mut self, key: CacheKey, value: V) {
        self.put_at(key, value, Instant::now());
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    /// Number of stored entries, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_live(&self, inserted: Instant, now: Instant) -> bool {
        now.saturating_duration_since(inserted) < self.ttl
    }

    fn get_at(&self, key: &CacheKey, now: Instant) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|(inserted, _)| self.is_live(*inserted, now))
            .map(|(_, value)| value)
    }

    fn put_at(&mut self, key: CacheKey, value: V, now: Instant) {
        self.entries.insert(key, (now, value));
    }

    fn purge_expired_at(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries
            .retain(|_, (inserted, _)| now.saturating_duration_since(*inserted) < ttl);
        before - self.entries.len()
    }
}
