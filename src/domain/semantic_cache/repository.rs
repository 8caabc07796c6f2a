//! Semantic cache storage trait and types

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ContextFingerprint;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// A generated answer cached under its prompt embedding
///
/// Entries are append-only: never updated, deduplicated, or expired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticCacheEntry {
    prompt: String,
    prompt_embedding: Vec<f32>,
    context: String,
    context_fingerprint: ContextFingerprint,
    response: String,
}

impl SemanticCacheEntry {
    pub fn new(
        prompt: impl Into<String>,
        prompt_embedding: Vec<f32>,
        context: impl Into<String>,
        context_fingerprint: ContextFingerprint,
        response: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            prompt_embedding,
            context: context.into(),
            context_fingerprint,
            response: response.into(),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn prompt_embedding(&self) -> &[f32] {
        &self.prompt_embedding
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn context_fingerprint(&self) -> &ContextFingerprint {
        &self.context_fingerprint
    }

    pub fn response(&self) -> &str {
        &self.response
    }
}

/// A stored answer and its distance to the probe embedding
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticMatch {
    pub response: String,
    pub distance: f32,
}

impl SemanticMatch {
    pub fn new(response: impl Into<String>, distance: f32) -> Self {
        Self {
            response: response.into(),
            distance,
        }
    }
}

/// Outcome of a semantic lookup
///
/// `distance` is reported on misses too, so callers can log how close the
/// nearest entry was. Both fields are `None` only when the cache is empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SemanticLookup {
    pub response: Option<String>,
    pub distance: Option<f32>,
}

impl SemanticLookup {
    pub fn hit(response: impl Into<String>, distance: f32) -> Self {
        Self {
            response: Some(response.into()),
            distance: Some(distance),
        }
    }

    pub fn miss(distance: Option<f32>) -> Self {
        Self {
            response: None,
            distance,
        }
    }

    pub fn is_hit(&self) -> bool {
        self.response.is_some()
    }
}

/// Storage for semantic cache entries
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SemanticCache: Send + Sync + Debug {
    /// Up to `limit` entries ordered by ascending distance to `embedding`
    ///
    /// Entries at equal distance keep insertion order.
    async fn nearest(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SemanticMatch>, DomainError>;

    /// Append an entry unconditionally
    async fn store(&self, entry: SemanticCacheEntry) -> Result<(), DomainError>;

    async fn size(&self) -> Result<usize, DomainError>;
}
