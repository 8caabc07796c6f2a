//! In-memory document store implementation

use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::document::{Document, DocumentStore, ScoredDocument};
use crate::domain::embedding::metric;
use crate::domain::DomainError;

/// Brute-force nearest-neighbour scan over every indexed document
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<Vec<Document>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn search(
        &self,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredDocument>, DomainError> {
        let documents = self.documents.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut scored = documents
            .iter()
            .map(|doc| {
                metric::distance(embedding, doc.embedding()).map(|distance| {
                    ScoredDocument::new(doc.content(), distance)
                        .with_metadata(doc.metadata().cloned())
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(top_k);

        Ok(scored)
    }

    async fn add_documents(&self, documents: Vec<Document>) -> Result<usize, DomainError> {
        let mut stored = self.documents.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let count = documents.len();
        stored.extend(documents);

        Ok(count)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let documents = self.documents.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(documents.len())
    }
}
