//! In-memory exact cache implementation

use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::exact_cache::{ExactCache, ExactCacheEntry};
use crate::domain::DomainError;

/// Append-only list of prompt/response pairs
///
/// Lookups scan in insertion order, so the oldest duplicate wins.
#[derive(Debug, Default)]
pub struct InMemoryExactCache {
    entries: RwLock<Vec<ExactCacheEntry>>,
}

impl InMemoryExactCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExactCache for InMemoryExactCache {
    async fn get(&self, prompt: &str) -> Result<Option<String>, DomainError> {
        let entries = self.entries.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(entries
            .iter()
            .find(|entry| entry.prompt == prompt)
            .map(|entry| entry.response.clone()))
    }

    async fn set(&self, prompt: &str, response: &str) -> Result<(), DomainError> {
        let mut entries = self.entries.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        entries.push(ExactCacheEntry::new(prompt, response));

        Ok(())
    }

    async fn size(&self) -> Result<usize, DomainError> {
        let entries = self.entries.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip() {
        let cache = InMemoryExactCache::new();

        cache.set("What is Rust?", "A language.").await.unwrap();

        assert_eq!(
            cache.get("What is Rust?").await.unwrap(),
            Some("A language.".to_string())
        );
    }

    #[tokio::test]
    async fn test_get_is_stable_without_writes() {
        let cache = InMemoryExactCache::new();
        cache.set("p", "r").await.unwrap();

        let first = cache.get("p").await.unwrap();
        let second = cache.get("p").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.get("missing").await.unwrap(), None);
        assert_eq!(cache.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_no_normalization() {
        let cache = InMemoryExactCache::new();
        cache.set("Hello", "hi").await.unwrap();

        assert_eq!(cache.get("hello").await.unwrap(), None);
        assert_eq!(cache.get("Hello ").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicates_are_appended_and_first_wins() {
        let cache = InMemoryExactCache::new();
        cache.set("p", "first").await.unwrap();
        cache.set("p", "second").await.unwrap();

        assert_eq!(cache.size().await.unwrap(), 2);
        assert_eq!(cache.get("p").await.unwrap(), Some("first".to_string()));
    }
}
