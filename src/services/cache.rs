use crate::models::CandidateMatch;
use crate::services::directory::{DirectoryError, DirectorySearch};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Short-lived memo of directory lookups
///
/// Backspacing over a fragment re-issues a query that was answered moments
/// ago; those hits are served from memory. Failed lookups are never stored.
pub struct CachedDirectory {
    inner: Arc<dyn DirectorySearch>,
    cache: moka::future::Cache<CacheKey, Vec<CandidateMatch>>,
}

/// Cache key for one lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    query: String,
    limit: usize,
}

impl CacheKey {
    pub fn new(query: &str, limit: usize) -> Self {
        Self {
            query: query.to_string(),
            limit,
        }
    }
}

impl CachedDirectory {
    pub fn new(inner: Arc<dyn DirectorySearch>, max_entries: u64, ttl: Duration) -> Self {
        let cache = moka::future::CacheBuilder::new(max_entries)
            .time_to_live(ttl)
            .build();

        Self { inner, cache }
    }

    /// Drop every memoised lookup
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        self.cache.run_pending_tasks().await;
        CacheStats {
            entries: self.cache.entry_count(),
        }
    }
}

#[async_trait]
impl DirectorySearch for CachedDirectory {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<CandidateMatch>, DirectoryError> {
        let key = CacheKey::new(query, limit);

        if let Some(hit) = self.cache.get(&key).await {
            tracing::trace!("Lookup cache hit: {:?}", query);
            return Ok(hit);
        }

        let customers = self.inner.search(query, limit).await?;
        self.cache.insert(key, customers.clone()).await;

        tracing::trace!("Lookup cache set: {:?}", query);
        Ok(customers)
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
}
