//! Indexed documents and nearest-neighbor context retrieval

mod entity;
mod store;

pub use entity::{Document, ScoredDocument};
pub use store::{DocumentStore, CONTEXT_SEPARATOR, DEFAULT_TOP_K};
