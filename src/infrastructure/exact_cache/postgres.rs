//! PostgreSQL exact cache implementation

use async_trait::async_trait;
use sqlx::postgres::PgPool;

use crate::domain::exact_cache::ExactCache;
use crate::domain::DomainError;

const SELECT_RESPONSE_SQL: &str =
    "SELECT response FROM exact_cache WHERE prompt = $1 ORDER BY id LIMIT 1";
const INSERT_ENTRY_SQL: &str = "INSERT INTO exact_cache (prompt, response) VALUES ($1, $2)";
const COUNT_SQL: &str = "SELECT COUNT(*) FROM exact_cache";

/// Exact cache backed by the `exact_cache` table
#[derive(Debug, Clone)]
pub struct PostgresExactCache {
    pool: PgPool,
}

impl PostgresExactCache {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExactCache for PostgresExactCache {
    async fn get(&self, prompt: &str) -> Result<Option<String>, DomainError> {
        sqlx::query_scalar::<_, String>(SELECT_RESPONSE_SQL)
            .bind(prompt)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to read exact cache: {}", e)))
    }

    async fn set(&self, prompt: &str, response: &str) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        // Dropping `tx` on error rolls the insert back
        sqlx::query(INSERT_ENTRY_SQL)
            .bind(prompt)
            .bind(response)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to write exact cache: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit exact cache: {}", e)))
    }

    async fn size(&self) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar(COUNT_SQL)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count exact cache: {}", e)))?;

        Ok(count.max(0) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_returns_oldest_literal_match() {
        assert!(SELECT_RESPONSE_SQL.contains("WHERE prompt = $1"));
        assert!(SELECT_RESPONSE_SQL.ends_with("ORDER BY id LIMIT 1"));
        assert!(!SELECT_RESPONSE_SQL.to_lowercase().contains("lower("));
    }

    #[test]
    fn test_insert_has_no_conflict_clause() {
        assert!(!INSERT_ENTRY_SQL.contains("ON CONFLICT"));
        assert!(COUNT_SQL.contains("exact_cache"));
    }
}
