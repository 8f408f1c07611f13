//! Proposal upload endpoint
//!
//! POST /ingest accepts a multipart form with a `file` part holding a JSON
//! proposal document, runs it through validation/flattening and the
//! transactional upsert, and answers with exactly one of two shapes:
//! `{"success": true, "count": N}` or `{"success": false, "message": ...}`.

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Successful ingestion response
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub success: bool,
    /// Number of proposals written in this run
    pub count: usize,
}

/// Accept a declared part content type only if it is a JSON type.
///
/// Many origins mislabel JSON uploads, so an exact `application/json` match
/// is too strict; an absent content type is accepted and the body is judged
/// by whether it parses.
fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim();
    essence.eq_ignore_ascii_case("application/json")
        || essence.eq_ignore_ascii_case("text/json")
        || essence.to_ascii_lowercase().ends_with("+json")
}

/// POST /ingest
///
/// The whole run is all-or-nothing: validation failure or a storage error
/// leaves the store untouched and surfaces a single summarized message.
pub async fn ingest_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<IngestResponse>> {
    let mut document: Option<Value> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed upload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        if let Some(content_type) = field.content_type() {
            if !is_json_content_type(content_type) {
                return Err(ApiError::BadRequest(format!(
                    "Invalid file type: {}. Only JSON files are allowed.",
                    content_type
                )));
            }
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("File upload failed: {}", e)))?;
        let parsed = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::BadRequest(format!("Invalid JSON format: {}", e)))?;
        document = Some(parsed);
        break;
    }

    let document = document.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;

    let proposals = crate::flatten::extract_proposals(&document)?;

    // The persister is never invoked with an empty batch.
    let count = if proposals.is_empty() {
        0
    } else {
        crate::db::proposals::save_proposals(&state.db, &proposals).await?
    };

    info!(count, "proposal document ingested");
    Ok(Json(IngestResponse {
        success: true,
        count,
    }))
}

/// Build ingestion routes
pub fn ingest_routes() -> Router<AppState> {
    Router::new().route("/ingest", post(ingest_upload))
}

#[cfg(test)]
mod tests {
    use super::is_json_content_type;

    #[test]
    fn json_content_types_are_accepted() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("application/json; charset=utf-8"));
        assert!(is_json_content_type("text/json"));
        assert!(is_json_content_type("application/hal+json"));
        assert!(is_json_content_type("Application/JSON"));
    }

    #[test]
    fn non_json_content_types_are_rejected() {
        assert!(!is_json_content_type("text/csv"));
        assert!(!is_json_content_type("application/octet-stream"));
        assert!(!is_json_content_type("text/plain"));
    }
}
