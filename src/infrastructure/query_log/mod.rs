//! Query audit log implementations

mod in_memory;
mod postgres;

pub use in_memory::InMemoryQueryLogRepository;
pub use postgres::PostgresQueryLogRepository;
