//! Exact-match prompt cache

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// A cached prompt/response pair keyed by the literal prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactCacheEntry {
    pub prompt: String,
    pub response: String,
}

impl ExactCacheEntry {
    pub fn new(prompt: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response: response.into(),
        }
    }
}

/// Cache keyed by literal prompt equality
///
/// No normalization is applied: prompts differing by one character are
/// distinct keys. Writes append without checking for an existing entry, so
/// concurrent misses on the same prompt can leave duplicates; reads return the
/// first match in store order.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ExactCache: Send + Sync + Debug {
    async fn get(&self, prompt: &str) -> Result<Option<String>, DomainError>;

    async fn set(&self, prompt: &str, response: &str) -> Result<(), DomainError>;

    /// Number of stored rows, duplicates included
    async fn size(&self) -> Result<usize, DomainError>;
}
