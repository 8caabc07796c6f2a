//! Document indexing

use std::sync::Arc;

use tracing::info;

use crate::domain::document::{Document, DocumentStore};
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::DomainError;

#[derive(Debug)]
pub struct IndexingService {
    embeddings: Arc<dyn EmbeddingProvider>,
    documents: Arc<dyn DocumentStore>,
    embedding_model: String,
}

impl IndexingService {
    pub fn new(
        embeddings: Arc<dyn EmbeddingProvider>,
        documents: Arc<dyn DocumentStore>,
        embedding_model: impl Into<String>,
    ) -> Self {
        Self {
            embeddings,
            documents,
            embedding_model: embedding_model.into(),
        }
    }

    /// Embed `documents` in one batch and store them together
    ///
    /// `metadata` pairs with documents by position; documents past its end
    /// are stored without metadata.
    pub async fn index_documents(
        &self,
        documents: Vec<String>,
        metadata: Option<Vec<serde_json::Value>>,
    ) -> Result<usize, DomainError> {
        if documents.is_empty() {
            return Ok(0);
        }

        let vectors = self
            .embeddings
            .embed_documents(&self.embedding_model, documents.clone())
            .await?;

        let mut metadata = metadata.unwrap_or_default().into_iter();

        let batch: Vec<Document> = documents
            .into_iter()
            .zip(vectors)
            .map(|(content, embedding)| Document::new(content, embedding).with_metadata(metadata.next()))
            .collect();

        let indexed = self.documents.add_documents(batch).await?;

        info!(indexed = indexed, model = %self.embedding_model, "Indexed documents");

        Ok(indexed)
    }

    pub async fn document_count(&self) -> Result<usize, DomainError> {
        self.documents.count().await
    }
}
