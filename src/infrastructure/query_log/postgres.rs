//! PostgreSQL query log

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::Row;

use crate::domain::query_log::{QueryLogEntry, QueryLogRepository};
use crate::domain::DomainError;

const INSERT_LOG_SQL: &str = r#"
    INSERT INTO query_logs (endpoint, request, response, status_code, created_at)
    VALUES ($1, $2, $3, $4, $5)
"#;
const RECENT_LOGS_SQL: &str = r#"
    SELECT endpoint, request, response, status_code, created_at
    FROM query_logs
    ORDER BY id DESC
    LIMIT $1
"#;

/// Audit log backed by the `query_logs` table
#[derive(Debug, Clone)]
pub struct PostgresQueryLogRepository {
    pool: PgPool,
}

impl PostgresQueryLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueryLogRepository for PostgresQueryLogRepository {
    async fn record(&self, entry: QueryLogEntry) -> Result<(), DomainError> {
        sqlx::query(INSERT_LOG_SQL)
            .bind(&entry.endpoint)
            .bind(&entry.request)
            .bind(&entry.response)
            .bind(i32::from(entry.status_code))
            .bind(entry.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to record query log: {}", e)))?;

        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<QueryLogEntry>, DomainError> {
        let rows = sqlx::query(RECENT_LOGS_SQL)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to read query logs: {}", e)))?;

        rows.into_iter()
            .map(|row| {
                let status_code: i32 = row.get("status_code");
                let created_at: DateTime<Utc> = row.get("created_at");

                Ok(QueryLogEntry {
                    endpoint: row.get("endpoint"),
                    request: row.get("request"),
                    response: row.get("response"),
                    status_code: u16::try_from(status_code).map_err(|e| {
                        DomainError::storage(format!("Invalid status code in query log: {}", e))
                    })?,
                    created_at,
                })
            })
            .collect()
    }
}
