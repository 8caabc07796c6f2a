//! Semantic cache domain models and traits
//!
//! Matches prompts by embedding proximity rather than literal text.

mod config;
mod fingerprint;
mod repository;

pub use config::SemanticCacheConfig;
pub use fingerprint::ContextFingerprint;
pub use repository::{SemanticCache, SemanticCacheEntry, SemanticLookup, SemanticMatch};

#[cfg(test)]
pub use repository::MockSemanticCache;
