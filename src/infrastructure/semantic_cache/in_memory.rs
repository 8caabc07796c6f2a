//! In-memory semantic cache implementation

use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::embedding::metric;
use crate::domain::semantic_cache::{SemanticCache, SemanticCacheEntry, SemanticMatch};
use crate::domain::DomainError;

/// In-memory semantic cache using a brute-force scan
///
/// Suitable for development and tests; entries are never evicted.
#[derive(Debug, Default)]
pub struct InMemorySemanticCache {
    entries: RwLock<Vec<SemanticCacheEntry>>,
}

impl InMemorySemanticCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SemanticCache for InMemorySemanticCache {
    async fn nearest(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SemanticMatch>, DomainError> {
        let entries = self.entries.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut matches = entries
            .iter()
            .map(|entry| {
                metric::distance(embedding, entry.prompt_embedding())
                    .map(|distance| SemanticMatch::new(entry.response(), distance))
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Stable sort keeps insertion order among equal distances
        matches.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        matches.truncate(limit);

        Ok(matches)
    }

    async fn store(&self, entry: SemanticCacheEntry) -> Result<(), DomainError> {
        let mut entries = self.entries.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        entries.push(entry);

        Ok(())
    }

    async fn size(&self) -> Result<usize, DomainError> {
        let entries = self.entries.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(entries.len())
    }
}
