//! Retrieval-augmented answering over the semantic cache
//!
//! One query walks: embed the prompt, fetch the top-k passages, fingerprint
//! them, consult the semantic cache and, on a miss, generate and write through.
//! Concurrent misses for the same prompt are not coordinated: each one
//! generates and each one appends its own cache entry.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info};

use super::answer::{ensure_prompt, prompt_preview, CacheStatus, SemanticAnswer};
use super::SemanticCacheService;
use crate::domain::document::{DocumentStore, DEFAULT_TOP_K};
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::llm::{LlmProvider, LlmRequest};
use crate::domain::semantic_cache::ContextFingerprint;
use crate::domain::DomainError;

/// Role and safety instruction sent ahead of every retrieval-augmented prompt
pub const SYSTEM_INSTRUCTION: &str = "You are an expert assistant designed to give helpful, safe and respectful answers at all times.

If the user opens with a greeting or an informal remark, reply in a friendly, empathetic and natural way.

If the user asks a question, answer using only the information contained in the provided context. If the context does not contain the answer, or is not enough to answer accurately, politely say that you do not have that information.

Under no circumstances should you:
- Invent or assume facts that are not explicitly in the context.
- Give false, ambiguous or unsupported information.
- Offer medical, legal or financial diagnoses in place of a qualified professional.
- Facilitate dangerous, illegal, discriminatory or unethical activities.
- Share or infer sensitive or personal information about the user or anyone else.
- Promote hate speech, violence or disinformation.

Your answers must be clear, responsible, impartial and focused on the user's wellbeing. Always put safety, fairness, transparency and privacy first.

If you detect a possible misunderstanding, risk or misuse of the requested information, answer with caution or decline politely with a reason.";

/// Models and retrieval depth used by the orchestrator
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    pub embedding_model: String,
    pub llm_model: String,
    pub top_k: usize,
}

impl RetrievalConfig {
    pub fn new(embedding_model: impl Into<String>, llm_model: impl Into<String>) -> Self {
        Self {
            embedding_model: embedding_model.into(),
            llm_model: llm_model.into(),
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }
}

#[derive(Debug)]
pub struct RetrievalOrchestrator {
    embeddings: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    documents: Arc<dyn DocumentStore>,
    semantic_cache: Arc<SemanticCacheService>,
    config: RetrievalConfig,
}

impl RetrievalOrchestrator {
    pub fn new(
        embeddings: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        documents: Arc<dyn DocumentStore>,
        semantic_cache: Arc<SemanticCacheService>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            embeddings,
            llm,
            documents,
            semantic_cache,
            config,
        }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Answer `prompt` from the semantic cache, generating on a miss
    ///
    /// Any failure aborts the query before the cache write, so a failed
    /// request never leaves an entry behind.
    pub async fn query(&self, prompt: &str) -> Result<SemanticAnswer, DomainError> {
        let started = Instant::now();

        let result = self.answer(prompt, started).await;

        if let Err(ref e) = result {
            error!(
                prompt_preview = %prompt_preview(prompt),
                error = %e,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Semantic query failed"
            );
        }

        result
    }

    async fn answer(&self, prompt: &str, started: Instant) -> Result<SemanticAnswer, DomainError> {
        ensure_prompt(prompt)?;

        let query_embedding = self
            .embeddings
            .embed_query(&self.config.embedding_model, prompt)
            .await?;

        let context = self
            .documents
            .top_k_context(&query_embedding, self.config.top_k)
            .await?;
        let fingerprint = ContextFingerprint::of(&context);

        let lookup = self
            .semantic_cache
            .get(prompt, &query_embedding, &fingerprint, None)
            .await?;

        if let Some(response) = lookup.response {
            return Ok(SemanticAnswer {
                response,
                cache_status: CacheStatus::Hit,
                min_distance: lookup.distance,
                elapsed: started.elapsed(),
            });
        }

        info!(
            prompt_preview = %prompt_preview(prompt),
            min_distance = ?lookup.distance,
            context_hash = fingerprint.short(),
            "Semantic cache miss, generating"
        );

        let request = Self::build_request(&context, prompt);
        let response = self
            .llm
            .chat(&self.config.llm_model, request)
            .await?
            .into_content();

        self.semantic_cache
            .set(prompt, query_embedding, &context, fingerprint, &response)
            .await?;

        let elapsed = started.elapsed();

        info!(
            prompt_preview = %prompt_preview(prompt),
            elapsed_ms = elapsed.as_millis() as u64,
            "Generated and cached response"
        );

        Ok(SemanticAnswer {
            response,
            cache_status: CacheStatus::Miss,
            min_distance: lookup.distance,
            elapsed,
        })
    }

    fn build_request(context: &str, prompt: &str) -> LlmRequest {
        LlmRequest::builder()
            .system(SYSTEM_INSTRUCTION)
            .user(format!("Context:\n{}\n\nQuestion: {}", context, prompt))
            .build()
    }
}
