//! Audit trail of endpoint calls

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// One audited endpoint call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryLogEntry {
    pub endpoint: String,
    pub request: serde_json::Value,
    pub response: serde_json::Value,
    pub status_code: u16,
    pub created_at: DateTime<Utc>,
}

impl QueryLogEntry {
    pub fn new(
        endpoint: impl Into<String>,
        request: serde_json::Value,
        response: serde_json::Value,
        status_code: u16,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            request,
            response,
            status_code,
            created_at: Utc::now(),
        }
    }
}

/// Append-only store for audit rows
#[cfg_attr(test, automock)]
#[async_trait]
pub trait QueryLogRepository: Send + Sync {
    async fn record(&self, entry: QueryLogEntry) -> Result<(), DomainError>;

    /// Most recent entries first
    async fn recent(&self, limit: usize) -> Result<Vec<QueryLogEntry>, DomainError>;
}
