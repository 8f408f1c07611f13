//! Error types for proposal-ingest
//!
//! Core ingestion errors (`IngestError`) are distinct from HTTP-surface
//! errors (`ApiError`). Every failure reaching the caller is summarized
//! into the single `{"success": false, "message": ...}` response shape.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors raised by the validate/flatten and persistence core.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Document does not contain the expected proposal list at
    /// `data.vendorProposals.edges`.
    #[error("Invalid JSON structure: {0}")]
    Structure(String),

    /// A required dotted path did not resolve to a non-null value.
    /// `record` is the zero-based index of the offending edge; it is
    /// carried for logging but kept out of the display message.
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str, record: usize },

    /// The store rejected a write or the transaction could not commit.
    #[error("Database error: {0}")]
    Persistence(#[from] sqlx::Error),
}

/// HTTP-facing error type for the upload endpoint.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Upload glue failure (400): no file part, bad multipart framing,
    /// wrong declared content type, or unparseable JSON.
    #[error("{0}")]
    BadRequest(String),

    /// Core ingestion failure; status depends on the variant.
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Ingest(IngestError::Persistence(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Ingest(_) => StatusCode::BAD_REQUEST,
        };

        if let ApiError::Ingest(IngestError::MissingField { field, record }) = &self {
            tracing::warn!(field, record, "batch rejected by validation");
        }

        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
