//! Proposal persistence
//!
//! Writes a validated batch inside one transaction: every record lands or
//! none does. Each write is an idempotent put keyed on `id`; re-ingesting a
//! known id overwrites the non-key columns and leaves `created_at` as set by
//! the original insert.

use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::IngestError;
use crate::flatten::FlatProposal;

/// One stored proposal row, as read back from the database.
#[derive(Debug, Clone)]
pub struct ProposalRow {
    pub id: String,
    pub status: String,
    pub job_posting_id: String,
    pub job_title: String,
    pub job_description: String,
    pub team_name: String,
    pub cover_letter: String,
    pub created_at: String,
}

/// Upsert a batch of proposals atomically.
///
/// Opens a single transaction, writes the records in input order, and
/// commits only if every write succeeded. Any failure rolls the whole
/// batch back and surfaces as `PersistenceError`; the store then equals
/// its pre-call state. Returns the number of records written.
pub async fn save_proposals(
    pool: &SqlitePool,
    proposals: &[FlatProposal],
) -> Result<usize, IngestError> {
    let mut tx = pool.begin().await?;

    for proposal in proposals {
        sqlx::query(
            r#"
            INSERT INTO proposals
                (id, status, job_posting_id, job_title, job_description, team_name, cover_letter)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                status = excluded.status,
                job_posting_id = excluded.job_posting_id,
                job_title = excluded.job_title,
                job_description = excluded.job_description,
                team_name = excluded.team_name,
                cover_letter = excluded.cover_letter
            "#,
        )
        .bind(&proposal.id)
        .bind(&proposal.status)
        .bind(&proposal.job_posting_id)
        .bind(&proposal.job_title)
        .bind(&proposal.job_description)
        .bind(&proposal.team_name)
        .bind(&proposal.cover_letter)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    debug!(count = proposals.len(), "proposal batch committed");
    Ok(proposals.len())
}

/// Count stored proposals
pub async fn count_proposals(pool: &SqlitePool) -> Result<i64, IngestError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM proposals")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Load one proposal by id
pub async fn load_proposal(pool: &SqlitePool, id: &str) -> Result<Option<ProposalRow>, IngestError> {
    let row = sqlx::query(
        r#"
        SELECT id, status, job_posting_id, job_title, job_description,
               team_name, cover_letter, created_at
        FROM proposals
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| ProposalRow {
        id: row.get("id"),
        status: row.get("status"),
        job_posting_id: row.get("job_posting_id"),
        job_title: row.get("job_title"),
        job_description: row.get("job_description"),
        team_name: row.get("team_name"),
        cover_letter: row.get("cover_letter"),
        created_at: row.get("created_at"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    // Single connection so the in-memory database is shared across queries.
    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        crate::db::ensure_schema(&pool)
            .await
            .expect("Failed to initialize schema");
        pool
    }

    fn proposal(id: &str, status: &str) -> FlatProposal {
        FlatProposal {
            id: id.to_string(),
            status: status.to_string(),
            job_posting_id: "jp-100".to_string(),
            job_title: "Rust developer".to_string(),
            job_description: "Build an ingestion service".to_string(),
            team_name: "Platform".to_string(),
            cover_letter: "Dear team,".to_string(),
        }
    }

    #[tokio::test]
    async fn saves_batch_and_reports_count() {
        let pool = test_pool().await;

        let batch = vec![proposal("p1", "ACTIVE"), proposal("p2", "DRAFT")];
        let written = save_proposals(&pool, &batch).await.unwrap();

        assert_eq!(written, 2);
        assert_eq!(count_proposals(&pool).await.unwrap(), 2);

        let loaded = load_proposal(&pool, "p2").await.unwrap().unwrap();
        assert_eq!(loaded.status, "DRAFT");
        assert_eq!(loaded.team_name, "Platform");
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let pool = test_pool().await;
        assert_eq!(save_proposals(&pool, &[]).await.unwrap(), 0);
        assert_eq!(count_proposals(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn reingest_overwrites_without_duplicating() {
        let pool = test_pool().await;

        save_proposals(&pool, &[proposal("p1", "ACTIVE")]).await.unwrap();

        // Pin created_at so preservation across the upsert is observable.
        sqlx::query("UPDATE proposals SET created_at = '2001-01-01 00:00:00' WHERE id = 'p1'")
            .execute(&pool)
            .await
            .unwrap();

        let mut updated = proposal("p1", "ARCHIVED");
        updated.cover_letter = "Revised letter".to_string();
        save_proposals(&pool, &[updated]).await.unwrap();

        assert_eq!(count_proposals(&pool).await.unwrap(), 1);
        let loaded = load_proposal(&pool, "p1").await.unwrap().unwrap();
        assert_eq!(loaded.status, "ARCHIVED");
        assert_eq!(loaded.cover_letter, "Revised letter");
        assert_eq!(loaded.created_at, "2001-01-01 00:00:00");
    }

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let pool = test_pool().await;
        crate::db::ensure_schema(&pool).await.unwrap();
        crate::db::ensure_schema(&pool).await.unwrap();
        assert_eq!(count_proposals(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn failed_batch_rolls_back_completely() {
        // A stricter proposals table stands in for an arbitrary storage
        // failure partway through a batch; ensure_schema's IF NOT EXISTS
        // leaves it in place.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query(
            r#"
            CREATE TABLE proposals (
                id TEXT PRIMARY KEY,
                status TEXT,
                job_posting_id TEXT,
                job_title TEXT,
                job_description TEXT,
                team_name TEXT,
                cover_letter TEXT CHECK (length(cover_letter) < 20),
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();
        crate::db::ensure_schema(&pool).await.unwrap();

        save_proposals(&pool, &[proposal("p0", "ACTIVE")]).await.unwrap();

        let mut oversized = proposal("p2", "DRAFT");
        oversized.cover_letter = "x".repeat(64);
        let batch = vec![proposal("p1", "ACTIVE"), oversized, proposal("p3", "DRAFT")];

        let err = save_proposals(&pool, &batch).await.unwrap_err();
        assert!(matches!(err, IngestError::Persistence(_)));

        // Nothing from the failed run was retained, including the valid
        // records before and after the faulty one.
        assert_eq!(count_proposals(&pool).await.unwrap(), 1);
        assert!(load_proposal(&pool, "p1").await.unwrap().is_none());
        assert!(load_proposal(&pool, "p3").await.unwrap().is_none());
        assert!(load_proposal(&pool, "p0").await.unwrap().is_some());
    }
}
