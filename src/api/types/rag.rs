//! Request and response bodies for the /rag endpoints

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::infrastructure::services::{CacheStatus, ExactAnswer, SemanticAnswer};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExactQueryResponse {
    pub result: String,
    pub cache_status: CacheStatus,
    /// Milliseconds
    pub elapsed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticQueryResponse {
    pub result: String,
    pub cache_status: CacheStatus,
    pub min_distance: Option<f32>,
    /// Milliseconds
    pub elapsed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRequest {
    pub documents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexResponse {
    pub indexed: usize,
}

impl From<ExactAnswer> for ExactQueryResponse {
    fn from(answer: ExactAnswer) -> Self {
        Self {
            result: answer.response,
            cache_status: answer.cache_status,
            elapsed: answer.elapsed.as_millis() as u64,
        }
    }
}

impl From<SemanticAnswer> for SemanticQueryResponse {
    fn from(answer: SemanticAnswer) -> Self {
        Self {
            result: answer.response,
            cache_status: answer.cache_status,
            min_distance: answer.min_distance,
            elapsed: answer.elapsed.as_millis() as u64,
        }
    }
}
