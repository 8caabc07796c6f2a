//! OpenAI embeddings adapter
//!
//! Vectors are pinned to the storage dimension: models that accept a
//! `dimensions` override are asked for it, and every returned vector is
//! checked against it before anything reaches a store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::embedding::{
    Embedding, EmbeddingInput, EmbeddingProvider, EmbeddingRequest, EmbeddingResponse,
    EmbeddingUsage,
};
use crate::domain::DomainError;
use crate::infrastructure::llm::HttpClientTrait;

/// Hosted models: native vector size, and whether `dimensions` may shorten it
const EMBEDDING_MODELS: &[(&str, usize, bool)] = &[
    ("text-embedding-3-small", 1536, true),
    ("text-embedding-3-large", 3072, true),
    ("text-embedding-ada-002", 1536, false),
];

/// Native vector size of a known model, if any
pub fn known_dimensions(model: &str) -> Option<usize> {
    EMBEDDING_MODELS
        .iter()
        .find(|(name, _, _)| *name == model)
        .map(|(_, dims, _)| *dims)
}

/// Whether the model honours a `dimensions` field; unknown models are assumed not to
pub fn accepts_dimensions(model: &str) -> bool {
    EMBEDDING_MODELS
        .iter()
        .any(|(name, _, adjustable)| *name == model && *adjustable)
}

#[derive(Debug)]
pub struct OpenAiEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    api_key: String,
    embeddings_url: String,
    output_dimensions: Option<usize>,
}

impl<C: HttpClientTrait> OpenAiEmbeddingProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>, base_url: &str) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            embeddings_url: format!("{}/v1/embeddings", base_url.trim_end_matches('/')),
            output_dimensions: None,
        }
    }

    /// Require every vector to have exactly `dimensions` components
    pub fn with_output_dimensions(mut self, dimensions: usize) -> Self {
        self.output_dimensions = Some(dimensions);
        self
    }

    fn build_request(&self, request: &EmbeddingRequest) -> Result<serde_json::Value, DomainError> {
        let dimensions = request.dimensions().or_else(|| {
            self.output_dimensions
                .filter(|_| accepts_dimensions(request.model()))
        });

        let body = EmbeddingsBody {
            model: request.model(),
            input: request.input(),
            dimensions,
        };

        serde_json::to_value(body).map_err(|e| {
            DomainError::provider("openai", format!("Failed to encode embedding request: {}", e))
        })
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<EmbeddingResponse, DomainError> {
        let response: OpenAiEmbeddingResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse embedding response: {}", e))
        })?;

        if let Some(expected) = self.output_dimensions {
            if let Some(bad) = response.data.iter().find(|d| d.embedding.len() != expected) {
                return Err(DomainError::provider(
                    "openai",
                    format!(
                        "Model {} returned {} dimensions, storage expects {}",
                        response.model,
                        bad.embedding.len(),
                        expected
                    ),
                ));
            }
        }

        let embeddings = response
            .data
            .into_iter()
            .map(|d| Embedding::new(d.index, d.embedding))
            .collect();
        let usage = response
            .usage
            .map(|u| EmbeddingUsage::new(u.prompt_tokens, u.total_tokens))
            .unwrap_or_default();

        Ok(EmbeddingResponse::new(response.model, embeddings, usage))
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for OpenAiEmbeddingProvider<C> {
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
        let body = self.build_request(&request)?;
        let response = self
            .client
            .post_json(&self.embeddings_url, &self.api_key, &body)
            .await?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

// OpenAI wire types

#[derive(Debug, Serialize)]
struct EmbeddingsBody<'a> {
    model: &'a str,
    input: &'a EmbeddingInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingResponse {
    model: String,
    data: Vec<OpenAiEmbeddingData>,
    usage: Option<OpenAiEmbeddingUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingUsage {
    prompt_tokens: u32,
    total_tokens: u32,
}
