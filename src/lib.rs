//! proposal-ingest - Vendor Proposal Ingestion Service
//!
//! Accepts an uploaded JSON document of vendor proposals
//! (`data.vendorProposals.edges[].node`), validates that every node carries
//! the seven required fields, flattens the nodes, and upserts them into a
//! SQLite `proposals` table inside one transaction. A run either writes the
//! whole batch or nothing.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod flatten;

pub use crate::error::{ApiError, ApiResult, IngestError};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::ingest_routes())
        .merge(api::health_routes())
        .with_state(state)
}
