//! Exact cache implementations

mod in_memory;
mod postgres;

pub use in_memory::InMemoryExactCache;
pub use postgres::PostgresExactCache;
