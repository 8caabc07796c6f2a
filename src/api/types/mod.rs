//! API request/response types

mod error;
mod json;
mod rag;

pub use error::{ApiError, ApiErrorDetail, ApiErrorResponse, ApiErrorType};
pub use json::Json;
pub use rag::{
    ExactQueryResponse, IndexRequest, IndexResponse, QueryRequest, SemanticQueryResponse,
};
