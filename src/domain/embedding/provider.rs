//! Embedding provider trait definition

use async_trait::async_trait;
use std::fmt::Debug;

use super::{EmbeddingRequest, EmbeddingResponse};
use crate::domain::DomainError;

/// Trait for embedding providers (OpenAI-compatible endpoints, local models, ...)
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Generate embeddings for the given input
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;

    /// Embed a single query text
    async fn embed_query(&self, model: &str, text: &str) -> Result<Vec<f32>, DomainError> {
        let response = self.embed(EmbeddingRequest::single(model, text)).await?;

        response
            .into_vectors()
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider(self.provider_name(), "No embedding returned"))
    }

    /// Embed a batch of documents, one vector per input in input order
    async fn embed_documents(
        &self,
        model: &str,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, DomainError> {
        let expected = texts.len();
        let vectors = self
            .embed(EmbeddingRequest::batch(model, texts))
            .await?
            .into_vectors();

        if vectors.len() != expected {
            return Err(DomainError::provider(
                self.provider_name(),
                format!(
                    "Embedding count mismatch: expected {}, got {}",
                    expected,
                    vectors.len()
                ),
            ));
        }

        Ok(vectors)
    }
}
