//! Retrieval and indexing endpoint handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::api::state::AppState;
use crate::api::types::{
    ApiError, ExactQueryResponse, IndexRequest, IndexResponse, Json, QueryRequest,
    SemanticQueryResponse,
};
use crate::domain::query_log::QueryLogEntry;

pub const QUERY_EXACT_ENDPOINT: &str = "/rag/query_exact";
pub const QUERY_SEMANTIC_ENDPOINT: &str = "/rag/query_semantic";
pub const INDEX_ENDPOINT: &str = "/rag/index";

/// Routes mounted under `/rag`
pub fn create_rag_router() -> Router<AppState> {
    Router::new()
        .route("/query_exact", post(query_exact))
        .route("/query_semantic", post(query_semantic))
        .route("/index", post(index))
}

/// POST /rag/query_exact
pub async fn query_exact(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Response {
    let result = state
        .exact_answers
        .exact_answer(&request.prompt)
        .await
        .map(ExactQueryResponse::from)
        .map_err(ApiError::from);

    respond_audited(&state, QUERY_EXACT_ENDPOINT, &request, result).await
}

/// POST /rag/query_semantic
pub async fn query_semantic(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Response {
    let result = state
        .retrieval
        .semantic_answer(&request.prompt)
        .await
        .map(SemanticQueryResponse::from)
        .map_err(ApiError::from);

    respond_audited(&state, QUERY_SEMANTIC_ENDPOINT, &request, result).await
}

/// POST /rag/index
pub async fn index(
    State(state): State<AppState>,
    Json(request): Json<IndexRequest>,
) -> Result<Json<IndexResponse>, ApiError> {
    debug!(documents = request.documents.len(), "Indexing documents");

    let indexed = state
        .indexer
        .index_documents(request.documents, request.metadata)
        .await?;

    Ok(Json(IndexResponse { indexed }))
}

/// Write the audit row, then hand back the response unchanged
async fn respond_audited<T: Serialize>(
    state: &AppState,
    endpoint: &str,
    request: &QueryRequest,
    result: Result<T, ApiError>,
) -> Response {
    let (status, body) = match &result {
        Ok(body) => (
            StatusCode::OK,
            serde_json::to_value(body).unwrap_or_default(),
        ),
        Err(err) => (err.status, err.body()),
    };

    let entry = QueryLogEntry::new(
        endpoint,
        serde_json::to_value(request).unwrap_or_default(),
        body,
        status.as_u16(),
    );

    if let Err(e) = state.query_log.record(entry).await {
        warn!(endpoint = endpoint, error = %e, "Failed to record query log");
    }

    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(err) => err.into_response(),
    }
}
