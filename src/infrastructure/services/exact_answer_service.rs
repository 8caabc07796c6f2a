//! Exact-match answering
//!
//! Bypasses retrieval and the semantic cache: the literal prompt is the key
//! and a miss sends the bare prompt to the model.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info};

use super::answer::{ensure_prompt, prompt_preview, CacheStatus, ExactAnswer};
use crate::domain::exact_cache::ExactCache;
use crate::domain::llm::{LlmProvider, LlmRequest};
use crate::domain::DomainError;

#[derive(Debug)]
pub struct ExactAnswerService {
    cache: Arc<dyn ExactCache>,
    llm: Arc<dyn LlmProvider>,
    llm_model: String,
}

impl ExactAnswerService {
    pub fn new(
        cache: Arc<dyn ExactCache>,
        llm: Arc<dyn LlmProvider>,
        llm_model: impl Into<String>,
    ) -> Self {
        Self {
            cache,
            llm,
            llm_model: llm_model.into(),
        }
    }

    pub async fn exact_answer(&self, prompt: &str) -> Result<ExactAnswer, DomainError> {
        let started = Instant::now();

        let result = self.answer(prompt, started).await;

        if let Err(ref e) = result {
            error!(
                prompt_preview = %prompt_preview(prompt),
                error = %e,
                "Exact query failed"
            );
        }

        result
    }

    async fn answer(&self, prompt: &str, started: Instant) -> Result<ExactAnswer, DomainError> {
        ensure_prompt(prompt)?;

        if let Some(response) = self.cache.get(prompt).await? {
            debug!(prompt_preview = %prompt_preview(prompt), "Exact cache hit");

            return Ok(ExactAnswer {
                response,
                cache_status: CacheStatus::Hit,
                elapsed: started.elapsed(),
            });
        }

        let request = LlmRequest::builder().user(prompt).build();
        let response = self
            .llm
            .chat(&self.llm_model, request)
            .await?
            .into_content();

        self.cache.set(prompt, &response).await?;

        let elapsed = started.elapsed();

        info!(
            prompt_preview = %prompt_preview(prompt),
            elapsed_ms = elapsed.as_millis() as u64,
            "Exact cache miss, generated and cached"
        );

        Ok(ExactAnswer {
            response,
            cache_status: CacheStatus::Miss,
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::exact_cache::MockExactCache;
    use crate::domain::llm::{MessageRole, MockLlmProvider};
    use crate::infrastructure::exact_cache::InMemoryExactCache;

    fn service(llm: MockLlmProvider) -> (ExactAnswerService, Arc<MockLlmProvider>, Arc<InMemoryExactCache>) {
        let llm = Arc::new(llm);
        let cache = Arc::new(InMemoryExactCache::new());
        let service = ExactAnswerService::new(cache.clone(), llm.clone(), "chat-model");
        (service, llm, cache)
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let (service, llm, cache) = service(MockLlmProvider::new("mock").with_content("42"));

        let first = service.exact_answer("meaning of life?").await.unwrap();
        let second = service.exact_answer("meaning of life?").await.unwrap();

        assert_eq!(first.cache_status, CacheStatus::Miss);
        assert_eq!(second.cache_status, CacheStatus::Hit);
        assert_eq!(second.response, "42");
        assert_eq!(llm.calls(), 1);
        assert_eq!(cache.size().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_miss_sends_bare_prompt() {
        let (service, llm, _) = service(MockLlmProvider::new("mock"));

        service.exact_answer("Hello there").await.unwrap();

        let request = &llm.requests()[0];
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, MessageRole::User);
        assert_eq!(request.messages[0].content, "Hello there");
    }

    #[tokio::test]
    async fn test_literal_keys() {
        let (service, llm, _) = service(MockLlmProvider::new("mock"));

        service.exact_answer("Hello").await.unwrap();
        let other = service.exact_answer("hello").await.unwrap();

        assert_eq!(other.cache_status, CacheStatus::Miss);
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_misses_insert_duplicates() {
        let barrier = Arc::new(tokio::sync::Barrier::new(2));
        let (service, llm, cache) =
            service(MockLlmProvider::new("mock").with_barrier(barrier));

        let (a, b) = tokio::join!(service.exact_answer("same"), service.exact_answer("same"));

        assert_eq!(a.unwrap().cache_status, CacheStatus::Miss);
        assert_eq!(b.unwrap().cache_status, CacheStatus::Miss);
        assert_eq!(llm.calls(), 2);
        assert_eq!(cache.size().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_generation_failure_leaves_no_entry() {
        let (service, _, cache) = service(MockLlmProvider::new("mock").with_error("boom"));

        let result = service.exact_answer("anything").await;

        assert!(matches!(result, Err(DomainError::Provider { .. })));
        assert_eq!(cache.size().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_cache_write_failure_propagates_after_generation() {
        let mut cache = MockExactCache::new();
        cache.expect_get().times(1).returning(|_| Ok(None));
        cache
            .expect_set()
            .withf(|prompt, response| prompt == "hello" && response == "hi there")
            .times(1)
            .returning(|_, _| Err(DomainError::storage("disk full")));

        let llm = Arc::new(MockLlmProvider::new("mock").with_content("hi there"));
        let service = ExactAnswerService::new(Arc::new(cache), llm.clone(), "chat-model");

        let result = service.exact_answer("hello").await;

        assert!(matches!(result, Err(DomainError::Storage { .. })));
        assert_eq!(llm.calls(), 1);
    }
}
