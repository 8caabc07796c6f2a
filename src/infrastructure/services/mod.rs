//! Application services

mod answer;
mod exact_answer_service;
mod indexing_service;
mod retrieval_service;
mod semantic_cache_service;

pub use answer::{CacheStatus, ExactAnswer, SemanticAnswer};
pub use exact_answer_service::ExactAnswerService;
pub use indexing_service::IndexingService;
pub use retrieval_service::{RetrievalConfig, RetrievalOrchestrator, SYSTEM_INSTRUCTION};
pub use semantic_cache_service::SemanticCacheService;
