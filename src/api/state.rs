//! Application state for shared services

use std::sync::Arc;

use serde_json::Value;

use crate::config::RateLimitConfig;
use crate::domain::query_log::QueryLogRepository;
use crate::domain::DomainError;
use crate::infrastructure::rate_limit::RateLimiter;
use crate::infrastructure::services::{
    ExactAnswer, ExactAnswerService, IndexingService, RetrievalOrchestrator, SemanticAnswer,
};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub exact_answers: Arc<dyn ExactAnswerServiceTrait>,
    pub retrieval: Arc<dyn RetrievalServiceTrait>,
    pub indexer: Arc<dyn IndexingServiceTrait>,
    pub query_log: Arc<dyn QueryLogRepository>,
    pub rate_limiter: Arc<RateLimiter>,
    pub rate_limits: RateLimitConfig,
}

impl AppState {
    pub fn new(
        exact_answers: Arc<dyn ExactAnswerServiceTrait>,
        retrieval: Arc<dyn RetrievalServiceTrait>,
        indexer: Arc<dyn IndexingServiceTrait>,
        query_log: Arc<dyn QueryLogRepository>,
    ) -> Self {
        Self {
            exact_answers,
            retrieval,
            indexer,
            query_log,
            rate_limiter: Arc::new(RateLimiter::new()),
            rate_limits: RateLimitConfig::default(),
        }
    }

    pub fn with_rate_limits(mut self, rate_limits: RateLimitConfig) -> Self {
        self.rate_limits = rate_limits;
        self
    }
}

/// Exact-match answering
#[async_trait::async_trait]
pub trait ExactAnswerServiceTrait: Send + Sync {
    async fn exact_answer(&self, prompt: &str) -> Result<ExactAnswer, DomainError>;
}

/// Retrieval-augmented answering behind the semantic cache
#[async_trait::async_trait]
pub trait RetrievalServiceTrait: Send + Sync {
    async fn semantic_answer(&self, prompt: &str) -> Result<SemanticAnswer, DomainError>;
}

#[async_trait::async_trait]
pub trait IndexingServiceTrait: Send + Sync {
    async fn index_documents(
        &self,
        documents: Vec<String>,
        metadata: Option<Vec<Value>>,
    ) -> Result<usize, DomainError>;

    /// Number of indexed documents; doubles as a storage reachability probe
    async fn document_count(&self) -> Result<usize, DomainError>;
}

// Implement traits for the actual services

#[async_trait::async_trait]
impl ExactAnswerServiceTrait for ExactAnswerService {
    async fn exact_answer(&self, prompt: &str) -> Result<ExactAnswer, DomainError> {
        ExactAnswerService::exact_answer(self, prompt).await
    }
}

#[async_trait::async_trait]
impl RetrievalServiceTrait for RetrievalOrchestrator {
    async fn semantic_answer(&self, prompt: &str) -> Result<SemanticAnswer, DomainError> {
        RetrievalOrchestrator::query(self, prompt).await
    }
}

#[async_trait::async_trait]
impl IndexingServiceTrait for IndexingService {
    async fn index_documents(
        &self,
        documents: Vec<String>,
        metadata: Option<Vec<Value>>,
    ) -> Result<usize, DomainError> {
        IndexingService::index_documents(self, documents, metadata).await
    }

    async fn document_count(&self) -> Result<usize, DomainError> {
        IndexingService::document_count(self).await
    }
}
