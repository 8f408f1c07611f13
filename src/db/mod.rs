//! Database access for proposal-ingest
//!
//! One SQLite database holding a single `proposals` table, opened once at
//! startup with read-write-create semantics.

pub mod proposals;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
///
/// Connects to the proposals database, creating the file and its parent
/// directory if missing, and ensures the schema exists.
pub async fn init_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    ensure_schema(&pool).await?;

    Ok(pool)
}

/// Create the `proposals` table if it does not exist.
///
/// Safe to call repeatedly. `created_at` is populated by SQLite on first
/// insert and never written by the upsert path.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), crate::error::IngestError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS proposals (
            id TEXT PRIMARY KEY,
            status TEXT,
            job_posting_id TEXT,
            job_title TEXT,
            job_description TEXT,
            team_name TEXT,
            cover_letter TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database schema initialized (proposals)");

    Ok(())
}
