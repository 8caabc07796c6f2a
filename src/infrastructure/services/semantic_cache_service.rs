//! Semantic cache lookup and write-through
//!
//! Matching is by embedding distance only. The prompt and context fingerprint
//! are accepted for logging and storage but never narrow the lookup.

use std::sync::Arc;

use tracing::debug;

use super::answer::prompt_preview;
use crate::domain::embedding::metric;
use crate::domain::semantic_cache::{
    ContextFingerprint, SemanticCache, SemanticCacheConfig, SemanticCacheEntry, SemanticLookup,
};
use crate::domain::DomainError;

#[derive(Debug)]
pub struct SemanticCacheService {
    cache: Arc<dyn SemanticCache>,
    config: SemanticCacheConfig,
}

impl SemanticCacheService {
    pub fn new(cache: Arc<dyn SemanticCache>) -> Self {
        Self::with_config(cache, SemanticCacheConfig::default())
    }

    pub fn with_config(cache: Arc<dyn SemanticCache>, config: SemanticCacheConfig) -> Self {
        Self { cache, config }
    }

    pub fn config(&self) -> &SemanticCacheConfig {
        &self.config
    }

    /// Look up the closest cached prompt
    ///
    /// Fetches the configured number of nearest candidates and decides on the
    /// first one alone. `threshold` falls back to the configured default.
    pub async fn get(
        &self,
        prompt: &str,
        prompt_embedding: &[f32],
        context_fingerprint: &ContextFingerprint,
        threshold: Option<f32>,
    ) -> Result<SemanticLookup, DomainError> {
        let threshold = threshold.unwrap_or(self.config.threshold);
        let candidates = self
            .cache
            .nearest(prompt_embedding, self.config.candidate_limit)
            .await?;

        let Some(closest) = candidates.into_iter().next() else {
            debug!(
                prompt_preview = %prompt_preview(prompt),
                context_hash = context_fingerprint.short(),
                "Semantic cache empty"
            );
            return Ok(SemanticLookup::miss(None));
        };

        let similarity = metric::similarity_percentage(closest.distance);

        if metric::is_hit(closest.distance, threshold) {
            debug!(
                prompt_preview = %prompt_preview(prompt),
                distance = closest.distance,
                similarity = similarity,
                threshold = threshold,
                "Semantic cache hit"
            );
            return Ok(SemanticLookup::hit(closest.response, closest.distance));
        }

        debug!(
            prompt_preview = %prompt_preview(prompt),
            distance = closest.distance,
            similarity = similarity,
            threshold = threshold,
            context_hash = context_fingerprint.short(),
            "Semantic cache miss"
        );

        Ok(SemanticLookup::miss(Some(closest.distance)))
    }

    /// Append an entry unconditionally; near-duplicates are not merged
    pub async fn set(
        &self,
        prompt: &str,
        prompt_embedding: Vec<f32>,
        context: &str,
        context_fingerprint: ContextFingerprint,
        response: &str,
    ) -> Result<(), DomainError> {
        let entry = SemanticCacheEntry::new(
            prompt,
            prompt_embedding,
            context,
            context_fingerprint,
            response,
        );

        self.cache.store(entry).await?;

        debug!(prompt_preview = %prompt_preview(prompt), "Semantic cache entry stored");

        Ok(())
    }

    pub async fn size(&self) -> Result<usize, DomainError> {
        self.cache.size().await
    }
}
