use std::fmt::Debug;

use async_trait::async_trait;

use super::{Document, ScoredDocument};
use crate::domain::DomainError;

/// Number of passages joined into a context by default
pub const DEFAULT_TOP_K: usize = 4;

/// Separator placed between passages in an assembled context
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Vector-indexed passage store
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug {
    /// The `top_k` passages closest to `embedding`, closest first
    async fn search(
        &self,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredDocument>, DomainError>;

    /// Persist a batch atomically, returning how many were written
    async fn add_documents(&self, documents: Vec<Document>) -> Result<usize, DomainError>;

    async fn count(&self) -> Result<usize, DomainError>;

    /// Join the closest passages into one context string
    ///
    /// An empty store yields an empty string.
    async fn top_k_context(&self, embedding: &[f32], top_k: usize) -> Result<String, DomainError> {
        let passages = self.search(embedding, top_k).await?;

        Ok(passages
            .into_iter()
            .map(|p| p.content)
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR))
    }
}
