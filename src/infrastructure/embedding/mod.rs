//! Embedding provider implementations

mod openai;

pub use openai::{accepts_dimensions, known_dimensions, OpenAiEmbeddingProvider};
