//! Storage infrastructure - PostgreSQL pool, schema and pgvector encoding

pub mod migrations;
mod pgvector;
mod postgres;

pub use migrations::{run_storage_migrations, Migration, PostgresMigrator};
pub use pgvector::embedding_to_pgvector;
pub use postgres::{connect, ping, PostgresConfig};
