//! In-memory query log

use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::query_log::{QueryLogEntry, QueryLogRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
pub struct InMemoryQueryLogRepository {
    entries: RwLock<Vec<QueryLogEntry>>,
}

impl InMemoryQueryLogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QueryLogRepository for InMemoryQueryLogRepository {
    async fn record(&self, entry: QueryLogEntry) -> Result<(), DomainError> {
        let mut entries = self.entries.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        entries.push(entry);

        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<QueryLogEntry>, DomainError> {
        let entries = self.entries.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(entries.iter().rev().take(limit).cloned().collect())
    }
}
