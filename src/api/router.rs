use axum::{http::HeaderValue, middleware, routing::get, Router};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::health;
use super::middleware::{logging_middleware, rate_limit_middleware};
use super::rag;
use super::state::AppState;

/// Build the CORS policy for the configured origins; unparsable origins are skipped
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Create the full router with application state
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .nest("/rag", rag::create_rag_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        extract::ConnectInfo,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::RateLimitConfig;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::llm::MockLlmProvider;
    use crate::domain::query_log::{MockQueryLogRepository, QueryLogRepository};
    use crate::domain::DomainError;
    use crate::api::state::mock::{test_app, test_app_with};

    fn origins() -> Vec<String> {
        vec!["http://localhost:3000".to_string()]
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_from(uri: &str, body: Value, ip: [u8; 4]) -> Request<Body> {
        let mut request = post(uri, body);
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from((ip, 50000))));
        request
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app(MockLlmProvider::new("mock"));
        let router = create_router(app.state, &origins());

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(&router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_ready_reports_storage() {
        let app = test_app(MockLlmProvider::new("mock"));
        let router = create_router(app.state, &origins());

        let request = Request::builder().uri("/ready").body(Body::empty()).unwrap();
        let (status, body) = send(&router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"][0]["name"], "storage");
        assert_eq!(body["checks"][0]["status"], "ok");
    }

    #[tokio::test]
    async fn test_exact_query_miss_then_hit() {
        let app = test_app(MockLlmProvider::new("mock").with_content("Paris"));
        let router = create_router(app.state, &origins());
        let prompt = json!({"prompt": "What is the capital of France?"});

        let (status, first) = send(&router, post("/rag/query_exact", prompt.clone())).await;
        let (_, second) = send(&router, post("/rag/query_exact", prompt)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["result"], "Paris");
        assert_eq!(first["cache_status"], "miss");
        assert!(first["elapsed"].is_u64());
        assert_eq!(second["cache_status"], "hit");
        assert_eq!(app.llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_semantic_query_miss_then_hit() {
        let app = test_app(MockLlmProvider::new("mock").with_content("Paris"));
        let router = create_router(app.state, &origins());
        let prompt = json!({"prompt": "What is the capital of France?"});

        let (_, first) = send(&router, post("/rag/query_semantic", prompt.clone())).await;
        let (_, second) = send(&router, post("/rag/query_semantic", prompt)).await;

        assert_eq!(first["cache_status"], "miss");
        assert!(first["min_distance"].is_null());
        assert_eq!(second["cache_status"], "hit");
        assert_eq!(second["result"], "Paris");
        assert!((second["min_distance"].as_f64().unwrap() + 1.0).abs() < 1e-4);
        assert_eq!(app.llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_queries_are_audited() {
        let app = test_app(MockLlmProvider::new("mock").with_content("Paris"));
        let query_log = app.query_log.clone();
        let router = create_router(app.state, &origins());

        send(&router, post("/rag/query_exact", json!({"prompt": "hi"}))).await;
        send(&router, post("/rag/query_semantic", json!({"prompt": "hi"}))).await;

        let rows = query_log.recent(10).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].endpoint, "/rag/query_semantic");
        assert_eq!(rows[1].endpoint, "/rag/query_exact");
        assert_eq!(rows[1].request, json!({"prompt": "hi"}));
        assert_eq!(rows[1].response["result"], "Paris");
        assert_eq!(rows[1].response["cache_status"], "miss");
        assert_eq!(rows[1].status_code, 200);
    }

    #[tokio::test]
    async fn test_provider_failure_is_generic_and_audited() {
        let app = test_app(MockLlmProvider::new("mock").with_error("invalid api key sk-live"));
        let query_log = app.query_log.clone();
        let router = create_router(app.state, &origins());

        let (status, body) = send(&router, post("/rag/query_exact", json!({"prompt": "hi"}))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], "Internal server error");
        assert_eq!(body["error"]["type"], "server_error");
        assert!(!body.to_string().contains("sk-live"));

        let rows = query_log.recent(10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status_code, 500);
    }

    #[tokio::test]
    async fn test_empty_prompt_is_bad_request() {
        let app = test_app(MockLlmProvider::new("mock"));
        let router = create_router(app.state, &origins());

        let (status, body) = send(&router, post("/rag/query_semantic", json!({"prompt": "  "}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Invalid request");
        assert_eq!(app.llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected_before_services() {
        let app = test_app(MockLlmProvider::new("mock"));
        let query_log = app.query_log.clone();
        let router = create_router(app.state, &origins());

        let (status, body) = send(&router, post("/rag/query_exact", json!({"question": "hi"}))).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "json_parse_error");
        assert!(query_log.recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_audit_failure_does_not_change_response() {
        let mut failing_log = MockQueryLogRepository::new();
        failing_log
            .expect_record()
            .returning(|_| Err(DomainError::storage("disk full")));

        let app = test_app(MockLlmProvider::new("mock").with_content("Paris"));
        let mut state = app.state;
        state.query_log = Arc::new(failing_log) as Arc<dyn QueryLogRepository>;
        let router = create_router(state, &origins());

        let (status, body) = send(&router, post("/rag/query_exact", json!({"prompt": "hi"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], "Paris");
    }

    #[tokio::test]
    async fn test_index_then_count() {
        let app = test_app(MockLlmProvider::new("mock"));
        let indexer = app.state.indexer.clone();
        let router = create_router(app.state, &origins());

        let (status, body) = send(
            &router,
            post(
                "/rag/index",
                json!({
                    "documents": ["Paris is the capital of France.", "Berlin is in Germany."],
                    "metadata": [{"source": "atlas"}]
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["indexed"], 2);
        assert_eq!(indexer.document_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_index_embedding_failure_is_generic_500() {
        let app = test_app_with(
            MockLlmProvider::new("mock"),
            MockEmbeddingProvider::new("mock", 8).with_error("connection refused"),
        );
        let router = create_router(app.state, &origins());

        let (status, body) = send(&router, post("/rag/index", json!({"documents": ["a"]}))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], "Internal server error");
    }

    #[tokio::test]
    async fn test_vector_size_mismatch_is_generic_500() {
        let app = test_app_with(
            MockLlmProvider::new("mock"),
            MockEmbeddingProvider::new("mock", 8).with_vector("short vector", vec![1.0, 0.0, 0.0]),
        );
        let router = create_router(app.state, &origins());

        send(&router, post("/rag/index", json!({"documents": ["eight dims"]}))).await;
        let (status, body) =
            send(&router, post("/rag/query_semantic", json!({"prompt": "short vector"}))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], "Internal server error");
        assert_eq!(app.llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_query_rate_limit_is_shared_across_query_endpoints() {
        let app = test_app(MockLlmProvider::new("mock"));
        let state = app.state.with_rate_limits(RateLimitConfig {
            query_per_minute: 2,
            index_per_minute: 2,
        });
        let router = create_router(state, &origins());
        let ip = [10, 0, 0, 1];

        let (first, _) = send(&router, post_from("/rag/query_exact", json!({"prompt": "a"}), ip)).await;
        let (second, _) =
            send(&router, post_from("/rag/query_semantic", json!({"prompt": "b"}), ip)).await;
        let (third, body) =
            send(&router, post_from("/rag/query_exact", json!({"prompt": "c"}), ip)).await;

        assert_eq!(first, StatusCode::OK);
        assert_eq!(second, StatusCode::OK);
        assert_eq!(third, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"]["message"], "Rate limit exceeded");
        assert_eq!(body["error"]["type"], "rate_limit_error");
        assert_eq!(app.llm.calls(), 2);
    }

    #[tokio::test]
    async fn test_rate_limit_is_per_client_and_per_group() {
        let app = test_app(MockLlmProvider::new("mock"));
        let state = app.state.with_rate_limits(RateLimitConfig {
            query_per_minute: 1,
            index_per_minute: 1,
        });
        let router = create_router(state, &origins());

        let (a, _) = send(&router, post_from("/rag/query_exact", json!({"prompt": "a"}), [10, 0, 0, 1])).await;
        let (b, _) = send(&router, post_from("/rag/query_exact", json!({"prompt": "a"}), [10, 0, 0, 2])).await;
        let (index, _) = send(&router, post_from("/rag/index", json!({"documents": []}), [10, 0, 0, 1])).await;
        let (index_again, _) =
            send(&router, post_from("/rag/index", json!({"documents": []}), [10, 0, 0, 1])).await;

        assert_eq!(a, StatusCode::OK);
        assert_eq!(b, StatusCode::OK);
        assert_eq!(index, StatusCode::OK);
        assert_eq!(index_again, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_health_is_not_rate_limited() {
        let app = test_app(MockLlmProvider::new("mock"));
        let state = app.state.with_rate_limits(RateLimitConfig {
            query_per_minute: 0,
            index_per_minute: 0,
        });
        let router = create_router(state, &origins());

        for _ in 0..3 {
            let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
            let (status, _) = send(&router, request).await;
            assert_eq!(status, StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let app = test_app(MockLlmProvider::new("mock"));
        let router = create_router(app.state, &origins());

        let request = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );

        let request = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "https://evil.example")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let app = test_app(MockLlmProvider::new("mock"));
        let router = create_router(app.state, &origins());

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert!(response.headers().contains_key("x-request-id"));
    }
}
