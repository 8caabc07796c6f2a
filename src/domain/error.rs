use thiserror::Error;

/// Core domain errors
///
/// Every failure in the retrieval and caching pipeline is one of these kinds.
/// Nothing is retried; the first error aborts the request and is returned to
/// the caller unchanged.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An embedding or generation call failed (network, quota, malformed response)
    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    /// A query or write against the store failed
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// The caller broke a precondition, such as sending an empty prompt
    #[error("Precondition violated: {message}")]
    Precondition { message: String },

    /// Two vectors compared or stored together differ in length
    #[error("Embedding dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Discriminant of a [`DomainError`], used at the API boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ProviderFailure,
    StorageFailure,
    PreconditionViolation,
    Configuration,
}

impl DomainError {
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    pub fn dimension_mismatch(left: usize, right: usize) -> Self {
        Self::DimensionMismatch { left, right }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Provider { .. } => ErrorKind::ProviderFailure,
            Self::Storage { .. } => ErrorKind::StorageFailure,
            Self::Precondition { .. } | Self::DimensionMismatch { .. } => {
                ErrorKind::PreconditionViolation
            }
            Self::Configuration { .. } => ErrorKind::Configuration,
        }
    }
}
