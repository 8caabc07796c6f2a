//! Domain layer - core entities, traits, and the vector metric

pub mod document;
pub mod embedding;
pub mod error;
pub mod exact_cache;
pub mod llm;
pub mod query_log;
pub mod semantic_cache;

pub use document::{Document, DocumentStore, ScoredDocument};
pub use embedding::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse};
pub use error::{DomainError, ErrorKind};
pub use exact_cache::{ExactCache, ExactCacheEntry};
pub use llm::{LlmProvider, LlmRequest, LlmResponse, Message, MessageRole};
pub use query_log::{QueryLogEntry, QueryLogRepository};
pub use semantic_cache::{
    ContextFingerprint, SemanticCache, SemanticCacheConfig, SemanticCacheEntry, SemanticLookup,
    SemanticMatch,
};
