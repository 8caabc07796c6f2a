//! RAG cache gateway
//!
//! Answers prompts through two caches in front of an LLM:
//! - an exact cache keyed by the literal prompt
//! - a semantic cache matched by embedding distance, filled by
//!   retrieval-augmented generation over an indexed document store

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::PgPool;
use tracing::{info, warn};

use api::state::AppState;
use config::StorageBackend;
use domain::{DocumentStore, ExactCache, QueryLogRepository, SemanticCache};
use infrastructure::{
    document::{InMemoryDocumentStore, PgvectorDocumentStore},
    embedding::{accepts_dimensions, known_dimensions, OpenAiEmbeddingProvider},
    exact_cache::{InMemoryExactCache, PostgresExactCache},
    llm::{HttpClient, OpenAiProvider},
    query_log::{InMemoryQueryLogRepository, PostgresQueryLogRepository},
    semantic_cache::{InMemorySemanticCache, PgvectorSemanticCache},
    services::{
        ExactAnswerService, IndexingService, RetrievalConfig, RetrievalOrchestrator,
        SemanticCacheService,
    },
    storage::{self, PostgresConfig},
};

/// Storage backends selected by configuration
struct Stores {
    documents: Arc<dyn DocumentStore>,
    exact_cache: Arc<dyn ExactCache>,
    semantic_cache: Arc<dyn SemanticCache>,
    query_log: Arc<dyn QueryLogRepository>,
}

impl Stores {
    fn in_memory() -> Self {
        Self {
            documents: Arc::new(InMemoryDocumentStore::new()),
            exact_cache: Arc::new(InMemoryExactCache::new()),
            semantic_cache: Arc::new(InMemorySemanticCache::new()),
            query_log: Arc::new(InMemoryQueryLogRepository::new()),
        }
    }

    fn postgres(pool: PgPool) -> Self {
        Self {
            documents: Arc::new(PgvectorDocumentStore::new(pool.clone())),
            exact_cache: Arc::new(PostgresExactCache::new(pool.clone())),
            semantic_cache: Arc::new(PgvectorSemanticCache::new(pool.clone())),
            query_log: Arc::new(PostgresQueryLogRepository::new(pool)),
        }
    }
}

/// Wire every component once, in dependency order
///
/// config, then pool and schema, then stores, providers, services and
/// finally the router state.
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    config.validate()?;

    let stores = match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage");
            Stores::in_memory()
        }
        StorageBackend::Postgres => {
            let url = config
                .storage
                .database_url
                .as_deref()
                .context("storage.database_url is required for the postgres backend")?;

            let pool = storage::connect(
                &PostgresConfig::new(url)
                    .with_max_connections(config.storage.max_connections)
                    .with_connect_timeout(config.storage.connect_timeout_secs),
            )
            .await?;
            storage::ping(&pool).await?;
            storage::run_storage_migrations(&pool, config.storage.embedding_dimensions).await?;

            info!(
                max_connections = config.storage.max_connections,
                dimensions = config.storage.embedding_dimensions,
                "Using PostgreSQL storage"
            );
            Stores::postgres(pool)
        }
    };

    let embedding_model = &config.rag.embedding_model;
    if let Some(native) = known_dimensions(embedding_model) {
        if native != config.storage.embedding_dimensions && !accepts_dimensions(embedding_model) {
            warn!(
                model = %config.rag.embedding_model,
                model_dimensions = native,
                configured_dimensions = config.storage.embedding_dimensions,
                "Embedding model cannot produce the storage dimension; queries will fail"
            );
        }
    }

    let api_key = config
        .provider
        .api_key
        .as_deref()
        .context("provider.api_key (or OPENAI_API_KEY) is required")?;
    let timeout = Duration::from_secs(config.provider.timeout_secs);

    let http = HttpClient::with_timeout(timeout)?;

    let llm = Arc::new(OpenAiProvider::new(
        http.clone(),
        api_key,
        &config.provider.base_url,
    ));
    let embeddings = Arc::new(
        OpenAiEmbeddingProvider::new(http, api_key, &config.provider.base_url)
            .with_output_dimensions(config.storage.embedding_dimensions),
    );

    let semantic_cache = Arc::new(SemanticCacheService::with_config(
        stores.semantic_cache,
        config.rag.semantic_cache_config(),
    ));

    let exact_answers = Arc::new(ExactAnswerService::new(
        stores.exact_cache,
        llm.clone(),
        &config.rag.llm_model,
    ));
    let retrieval = Arc::new(RetrievalOrchestrator::new(
        embeddings.clone(),
        llm,
        stores.documents.clone(),
        semantic_cache,
        RetrievalConfig::new(&config.rag.embedding_model, &config.rag.llm_model)
            .with_top_k(config.rag.top_k),
    ));
    let indexer = Arc::new(IndexingService::new(
        embeddings,
        stores.documents,
        &config.rag.embedding_model,
    ));

    info!(
        embedding_model = %config.rag.embedding_model,
        llm_model = %config.rag.llm_model,
        threshold = config.rag.threshold,
        top_k = config.rag.top_k,
        "Services initialized"
    );

    Ok(
        AppState::new(exact_answers, retrieval, indexer, stores.query_log)
            .with_rate_limits(config.rate_limit.clone()),
    )
}
