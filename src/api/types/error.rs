//! JSON error bodies returned by every endpoint

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::domain::{DomainError, ErrorKind};

const INTERNAL_MESSAGE: &str = "Internal server error";
const INVALID_REQUEST_MESSAGE: &str = "Invalid request";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    RateLimitError,
    ServerError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestError => write!(f, "invalid_request_error"),
            Self::RateLimitError => write!(f, "rate_limit_error"),
            Self::ServerError => write!(f, "server_error"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
    /// Seconds until a rate-limited client may retry
    pub retry_after: Option<u64>,
}

impl ApiError {
    pub fn new(status: StatusCode, error_type: ApiErrorType, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    error_type,
                    code: None,
                },
            },
            retry_after: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.response.error.code = Some(code.into());
        self
    }

    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after = Some(seconds);
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorType::InvalidRequestError, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, ApiErrorType::RateLimitError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ApiErrorType::ServerError, message)
    }

    /// Serialized body, as written to the audit log
    pub fn body(&self) -> serde_json::Value {
        serde_json::to_value(&self.response).unwrap_or_default()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.response)).into_response();

        if let Some(seconds) = self.retry_after {
            if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

/// Internal messages never reach the client; they are logged here instead
impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match (&err, err.kind()) {
            (DomainError::DimensionMismatch { .. }, _)
            | (_, ErrorKind::ProviderFailure | ErrorKind::StorageFailure | ErrorKind::Configuration) => {
                error!(error = %err, "Request failed");
                Self::internal(INTERNAL_MESSAGE)
            }
            (_, ErrorKind::PreconditionViolation) => {
                info!(error = %err, "Rejected request");
                Self::bad_request(INVALID_REQUEST_MESSAGE)
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.error_type, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_creation() {
        let err = ApiError::bad_request("Invalid prompt");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error.error_type, ApiErrorType::InvalidRequestError);
        assert_eq!(err.response.error.message, "Invalid prompt");
    }

    #[test]
    fn test_provider_failure_is_generic_500() {
        let api_err: ApiError = DomainError::provider("openai", "quota exceeded for key sk-123").into();

        assert_eq!(api_err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_err.response.error.error_type, ApiErrorType::ServerError);
        assert_eq!(api_err.response.error.message, "Internal server error");
        assert!(!api_err.body().to_string().contains("sk-123"));
    }

    #[test]
    fn test_storage_failure_is_generic_500() {
        let api_err: ApiError = DomainError::storage("relation \"exact_cache\" does not exist").into();

        assert_eq!(api_err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_err.response.error.message, "Internal server error");
    }

    #[test]
    fn test_precondition_is_generic_400() {
        let api_err: ApiError = DomainError::precondition("prompt must not be empty").into();

        assert_eq!(api_err.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_err.response.error.message, "Invalid request");
    }

    #[test]
    fn test_dimension_mismatch_is_generic_500() {
        let api_err: ApiError = DomainError::dimension_mismatch(1536, 3).into();

        assert_eq!(api_err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_err.response.error.message, "Internal server error");
        assert!(!api_err.body().to_string().contains("1536"));
    }

    #[test]
    fn test_error_serialization() {
        let err = ApiError::internal("Internal server error");
        let json = serde_json::to_value(&err.response).unwrap();

        assert_eq!(json["error"]["type"], "server_error");
        assert_eq!(json["error"]["message"], "Internal server error");
        assert!(json["error"].get("code").is_none());
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = ApiError::rate_limited("Rate limit exceeded")
            .with_retry_after(42)
            .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
    }
}
