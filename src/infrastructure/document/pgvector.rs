//! pgvector document store implementation

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Row;

use crate::domain::document::{Document, DocumentStore, ScoredDocument};
use crate::domain::embedding::metric::INNER_PRODUCT_OPERATOR;
use crate::domain::DomainError;
use crate::infrastructure::storage::embedding_to_pgvector;

const INSERT_DOCUMENT_SQL: &str =
    "INSERT INTO documents (content, embedding, metadata) VALUES ($1, $2::vector, $3)";
const COUNT_SQL: &str = "SELECT COUNT(*) FROM documents";

/// Document store backed by the `documents` table
#[derive(Debug, Clone)]
pub struct PgvectorDocumentStore {
    pool: PgPool,
}

impl PgvectorDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn search_sql() -> String {
        format!(
            r#"
            SELECT content, metadata, (embedding {op} $1::vector)::float8 AS distance
            FROM documents
            ORDER BY distance, id
            LIMIT $2
            "#,
            op = INNER_PRODUCT_OPERATOR
        )
    }
}

#[async_trait]
impl DocumentStore for PgvectorDocumentStore {
    async fn search(
        &self,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredDocument>, DomainError> {
        let rows = sqlx::query(&Self::search_sql())
            .bind(embedding_to_pgvector(embedding))
            .bind(top_k as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Document search failed: {}", e)))?;

        tracing::debug!(rows = rows.len(), top_k = top_k, "Retrieved documents");

        Ok(rows
            .into_iter()
            .map(|row| {
                let content: String = row.get("content");
                let metadata: Option<serde_json::Value> = row.get("metadata");
                let distance: f64 = row.get("distance");
                ScoredDocument::new(content, distance as f32).with_metadata(metadata)
            })
            .collect())
    }

    async fn add_documents(&self, documents: Vec<Document>) -> Result<usize, DomainError> {
        if documents.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        for doc in &documents {
            sqlx::query(INSERT_DOCUMENT_SQL)
                .bind(doc.content())
                .bind(embedding_to_pgvector(doc.embedding()))
                .bind(doc.metadata().cloned())
                .execute(&mut *tx)
                .await
                .map_err(|e| DomainError::storage(format!("Failed to insert document: {}", e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit documents: {}", e)))?;

        Ok(documents.len())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar(COUNT_SQL)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count documents: {}", e)))?;

        Ok(count.max(0) as usize)
    }
}
