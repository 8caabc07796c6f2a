//! Infrastructure layer - storage backends, providers and services

pub mod document;
pub mod embedding;
pub mod exact_cache;
pub mod llm;
pub mod logging;
pub mod query_log;
pub mod rate_limit;
pub mod semantic_cache;
pub mod services;
pub mod storage;
