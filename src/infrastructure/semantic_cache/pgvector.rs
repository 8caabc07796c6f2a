//! pgvector semantic cache implementation

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Row;

use crate::domain::embedding::metric::INNER_PRODUCT_OPERATOR;
use crate::domain::semantic_cache::{SemanticCache, SemanticCacheEntry, SemanticMatch};
use crate::domain::DomainError;
use crate::infrastructure::storage::embedding_to_pgvector;

const INSERT_ENTRY_SQL: &str = r#"
    INSERT INTO semantic_cache (prompt, prompt_embedding, context, context_hash, response)
    VALUES ($1, $2::vector, $3, $4, $5)
"#;
const COUNT_SQL: &str = "SELECT COUNT(*) FROM semantic_cache";

/// Semantic cache backed by the `semantic_cache` table
#[derive(Debug, Clone)]
pub struct PgvectorSemanticCache {
    pool: PgPool,
}

impl PgvectorSemanticCache {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Nearest entries by inner-product distance; `id` breaks ties oldest first
    fn nearest_sql() -> String {
        format!(
            r#"
            SELECT response, (prompt_embedding {op} $1::vector)::float8 AS distance
            FROM semantic_cache
            ORDER BY distance, id
            LIMIT $2
            "#,
            op = INNER_PRODUCT_OPERATOR
        )
    }
}

#[async_trait]
impl SemanticCache for PgvectorSemanticCache {
    async fn nearest(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SemanticMatch>, DomainError> {
        let rows = sqlx::query(&Self::nearest_sql())
            .bind(embedding_to_pgvector(embedding))
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Semantic cache lookup failed");
                DomainError::storage(format!("Failed to search semantic cache: {}", e))
            })?;

        let matches = rows
            .into_iter()
            .map(|row| {
                let response: String = row.get("response");
                let distance: f64 = row.get("distance");
                SemanticMatch::new(response, distance as f32)
            })
            .collect();

        Ok(matches)
    }

    async fn store(&self, entry: SemanticCacheEntry) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        sqlx::query(INSERT_ENTRY_SQL)
            .bind(entry.prompt())
            .bind(embedding_to_pgvector(entry.prompt_embedding()))
            .bind(entry.context())
            .bind(entry.context_fingerprint().as_str())
            .bind(entry.response())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to write semantic cache: {}", e))
            })?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit semantic cache: {}", e)))
    }

    async fn size(&self) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar(COUNT_SQL)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count semantic cache: {}", e)))?;

        Ok(count.max(0) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_sql_uses_inner_product_and_tie_break() {
        let sql = PgvectorSemanticCache::nearest_sql();

        assert!(sql.contains("prompt_embedding <#> $1::vector"));
        assert!(sql.contains("ORDER BY distance, id"));
        assert!(sql.contains("LIMIT $2"));
    }

    #[test]
    fn test_lookup_ignores_prompt_and_fingerprint() {
        let sql = PgvectorSemanticCache::nearest_sql();

        assert!(!sql.contains("WHERE"));
        assert!(!sql.contains("context_hash"));
    }

    #[test]
    fn test_insert_stores_fingerprint_column() {
        assert!(INSERT_ENTRY_SQL.contains("context_hash"));
        assert!(INSERT_ENTRY_SQL.contains("$2::vector"));
    }
}
