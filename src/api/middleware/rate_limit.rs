//! Per-client rate limiting for the /rag endpoints

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::api::rag::{INDEX_ENDPOINT, QUERY_EXACT_ENDPOINT, QUERY_SEMANTIC_ENDPOINT};
use crate::api::state::AppState;
use crate::api::types::ApiError;

/// Endpoints sharing one request budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitGroup {
    Query,
    Index,
}

impl RateLimitGroup {
    pub fn for_path(path: &str) -> Option<Self> {
        match path {
            QUERY_EXACT_ENDPOINT | QUERY_SEMANTIC_ENDPOINT => Some(Self::Query),
            INDEX_ENDPOINT => Some(Self::Index),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Index => "index",
        }
    }
}

/// Reject requests over the configured per-minute budget with 429
///
/// Clients are keyed by peer address; without connection info every caller
/// shares the "unknown" budget.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(group) = RateLimitGroup::for_path(request.uri().path()) else {
        return next.run(request).await;
    };

    let limit = match group {
        RateLimitGroup::Query => state.rate_limits.query_per_minute,
        RateLimitGroup::Index => state.rate_limits.index_per_minute,
    };

    let client = client_ip(&request);
    let key = format!("{}:{}", group.as_str(), client);
    let result = state.rate_limiter.check_and_record(&key, limit).await;

    if !result.allowed {
        warn!(
            client = %client,
            group = group.as_str(),
            limit = result.limit,
            reset_in_seconds = result.reset_in_seconds,
            "Rate limit exceeded"
        );

        return ApiError::rate_limited("Rate limit exceeded")
            .with_retry_after(result.reset_in_seconds)
            .into_response();
    }

    next.run(request).await
}

fn client_ip(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_by_path() {
        assert_eq!(
            RateLimitGroup::for_path("/rag/query_exact"),
            Some(RateLimitGroup::Query)
        );
        assert_eq!(
            RateLimitGroup::for_path("/rag/query_semantic"),
            Some(RateLimitGroup::Query)
        );
        assert_eq!(
            RateLimitGroup::for_path("/rag/index"),
            Some(RateLimitGroup::Index)
        );
        assert_eq!(RateLimitGroup::for_path("/health"), None);
    }

    #[test]
    fn test_client_ip_from_connect_info() {
        let mut request = Request::builder().uri("/").body(Body::empty()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 7], 4242))));

        assert_eq!(client_ip(&request), "10.0.0.7");
    }

    #[test]
    fn test_client_ip_without_connect_info() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();

        assert_eq!(client_ip(&request), "unknown");
    }
}
