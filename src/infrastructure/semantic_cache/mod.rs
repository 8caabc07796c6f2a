//! Semantic cache implementations

mod in_memory;
mod pgvector;

pub use in_memory::InMemorySemanticCache;
pub use pgvector::PgvectorSemanticCache;
