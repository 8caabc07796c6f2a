//! Bearer-authenticated JSON transport shared by the OpenAI adapters

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::DomainError;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Longest slice of an upstream error body carried into a provider error
const ERROR_BODY_LIMIT: usize = 200;

/// JSON POST seam between provider adapters and the network
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn post_json(&self, url: &str, api_key: &str, body: &Value)
        -> Result<Value, DomainError>;
}

/// reqwest client with a per-request timeout
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn with_timeout(timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                DomainError::configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        api_key: &str,
        body: &Value,
    ) -> Result<Value, DomainError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| DomainError::provider("http", transport_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(DomainError::provider(
                "http",
                status_error(status.as_u16(), &error_body),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| DomainError::provider("http", format!("Failed to decode response: {}", e)))
    }
}

fn transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("Request timed out: {}", e)
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        format!("Request failed: {}", e)
    }
}

/// Status line plus the head of the upstream body
fn status_error(status: u16, body: &str) -> String {
    let body = body.trim();
    let mut head: String = body.chars().take(ERROR_BODY_LIMIT).collect();

    if head.len() < body.len() {
        head.push_str("...");
    }

    if head.is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("HTTP {}: {}", status, head)
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::RwLock;

    /// A request the mock received
    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub url: String,
        pub api_key: String,
        pub body: Value,
    }

    /// Canned responses keyed by URL; also records every request
    #[derive(Debug, Default)]
    pub struct MockHttpClient {
        responses: RwLock<HashMap<String, Value>>,
        errors: RwLock<HashMap<String, String>>,
        requests: RwLock<Vec<RecordedRequest>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(self, url: impl Into<String>, response: Value) -> Self {
            self.responses.write().unwrap().insert(url.into(), response);
            self
        }

        pub fn with_error(self, url: impl Into<String>, error: impl Into<String>) -> Self {
            self.errors.write().unwrap().insert(url.into(), error.into());
            self
        }

        pub fn last_request(&self) -> Option<RecordedRequest> {
            self.requests.read().unwrap().last().cloned()
        }

        pub fn last_body(&self) -> Option<Value> {
            self.last_request().map(|r| r.body)
        }
    }

    #[async_trait]
    impl HttpClientTrait for MockHttpClient {
        async fn post_json(
            &self,
            url: &str,
            api_key: &str,
            body: &Value,
        ) -> Result<Value, DomainError> {
            self.requests.write().unwrap().push(RecordedRequest {
                url: url.to_string(),
                api_key: api_key.to_string(),
                body: body.clone(),
            });

            if let Some(error) = self.errors.read().unwrap().get(url) {
                return Err(DomainError::provider("mock", error));
            }

            self.responses
                .read()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| DomainError::provider("mock", format!("No mock response for {}", url)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_keeps_short_body() {
        assert_eq!(
            status_error(429, " {\"error\":\"quota\"}\n"),
            "HTTP 429: {\"error\":\"quota\"}"
        );
    }

    #[test]
    fn test_status_error_truncates_long_body() {
        let body = "x".repeat(ERROR_BODY_LIMIT + 50);

        let message = status_error(500, &body);

        assert!(message.ends_with("..."));
        assert_eq!(message.len(), "HTTP 500: ".len() + ERROR_BODY_LIMIT + 3);
    }

    #[test]
    fn test_status_error_without_body() {
        assert_eq!(status_error(502, "   "), "HTTP 502");
    }

    #[test]
    fn test_client_builds_with_timeout() {
        assert!(HttpClient::with_timeout(Duration::from_secs(5)).is_ok());
    }
}
