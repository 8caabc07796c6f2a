use serde::Deserialize;

use crate::domain::document::DEFAULT_TOP_K;
use crate::domain::embedding::metric::DEFAULT_DISTANCE_THRESHOLD;
use crate::domain::semantic_cache::SemanticCacheConfig;
use crate::domain::DomainError;
use crate::infrastructure::llm::DEFAULT_OPENAI_BASE_URL;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub rag: RagConfig,
    pub provider: ProviderConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection
    pub connect_timeout_secs: u64,
    /// Size of every stored vector; must match the embedding model's output
    pub embedding_dimensions: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Semantic cache hit threshold (negative inner product)
    pub threshold: f32,
    pub top_k: usize,
    /// Nearest cache entries fetched per lookup
    pub semantic_candidates: usize,
    pub embedding_model: String,
    pub llm_model: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub query_per_minute: u32,
    pub index_per_minute: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: [
                "http://localhost",
                "http://localhost:8000",
                "http://localhost:3000",
                "http://localhost:5173",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: None,
            max_connections: 10,
            connect_timeout_secs: 30,
            embedding_dimensions: 1536,
        }
    }
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_DISTANCE_THRESHOLD,
            top_k: DEFAULT_TOP_K,
            semantic_candidates: 5,
            embedding_model: "text-embedding-3-small".to_string(),
            llm_model: "gpt-4o-mini".to_string(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            timeout_secs: 120,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            query_per_minute: 5,
            index_per_minute: 2,
        }
    }
}

impl RagConfig {
    pub fn semantic_cache_config(&self) -> SemanticCacheConfig {
        SemanticCacheConfig::new()
            .with_threshold(self.threshold)
            .with_candidate_limit(self.semantic_candidates)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: Self = config.try_deserialize()?;
        app_config.apply_legacy_env(|key| std::env::var(key).ok())?;

        Ok(app_config)
    }

    /// Honour the flat variable names older deployments set
    ///
    /// `DATABASE_URL` wins over the `POSTGRES_*` parts; a database URL from
    /// either source also switches storage to postgres.
    pub fn apply_legacy_env<F>(&mut self, lookup: F) -> Result<(), config::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("CACHE_DISTANCE_THRESHOLD") {
            self.rag.threshold = raw.trim().parse().map_err(|e| {
                config::ConfigError::Message(format!(
                    "CACHE_DISTANCE_THRESHOLD must be a number: {}",
                    e
                ))
            })?;
        }

        if let Some(model) = lookup("EMBEDDING_MODEL") {
            self.rag.embedding_model = model;
        }

        if let Some(model) = lookup("LLM_MODEL") {
            self.rag.llm_model = model;
        }

        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.provider.api_key = Some(key);
        }

        if let Some(origins) = lookup("CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }

        let database_url = match lookup("DATABASE_URL") {
            Some(url) => Some(url),
            None => postgres_url_from_parts(&lookup)?,
        };

        if let Some(url) = database_url {
            self.storage.database_url = Some(url);
            self.storage.backend = StorageBackend::Postgres;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.rag.threshold.is_finite() {
            return Err(DomainError::configuration("rag.threshold must be finite"));
        }

        if self.rag.top_k == 0 {
            return Err(DomainError::configuration("rag.top_k must be at least 1"));
        }

        if self.storage.embedding_dimensions == 0 {
            return Err(DomainError::configuration(
                "storage.embedding_dimensions must be at least 1",
            ));
        }

        if self.storage.backend == StorageBackend::Postgres && self.storage.database_url.is_none()
        {
            return Err(DomainError::configuration(
                "storage.database_url is required for the postgres backend",
            ));
        }

        Ok(())
    }
}

/// Assemble a connection URL from `POSTGRES_*` parts, percent-encoding the credentials
fn postgres_url_from_parts<F>(lookup: &F) -> Result<Option<String>, config::ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let (Some(user), Some(password), Some(host), Some(db)) = (
        lookup("POSTGRES_USER"),
        lookup("POSTGRES_PASSWORD"),
        lookup("POSTGRES_HOST"),
        lookup("POSTGRES_DB"),
    ) else {
        return Ok(None);
    };
    let port = lookup("POSTGRES_PORT").unwrap_or_else(|| "5432".to_string());

    let mut url = reqwest::Url::parse(&format!("postgres://{}:{}/{}", host, port, db))
        .map_err(|e| {
            config::ConfigError::Message(format!("POSTGRES_HOST/PORT/DB form an invalid URL: {}", e))
        })?;
    let credentials_rejected =
        || config::ConfigError::Message("POSTGRES_USER/PASSWORD cannot be set on the URL".into());
    url.set_username(&user).map_err(|_| credentials_rejected())?;
    url.set_password(Some(&password))
        .map_err(|_| credentials_rejected())?;

    Ok(Some(url.into()))
}
