//! Repository for the `recordings` table.

use lens_core::types::DbId;
use sqlx::PgPool;

use crate::models::recording::{CreateRecording, Recording, RecordingKind};

/// Column list for `recordings` queries.
const COLUMNS: &str = "id, name, kind, location, conditions, recorded_at, added_at";

/// Provides CRUD operations for uploaded recordings.
pub struct RecordingRepo;

impl RecordingRepo {
    /// Create a recording from upload form data, returning the created row.
    pub async fn create(
        pool: &PgPool,
        kind: RecordingKind,
        input: &CreateRecording,
    ) -> Result<Recording, sqlx::Error> {
        let query = format!(
            "INSERT INTO recordings (name, kind, location, conditions, recorded_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Recording>(&query)
            .bind(&input.name)
            .bind(kind.as_str())
            .bind(&input.location)
            .bind(&input.conditions)
            .bind(input.recorded_at)
            .fetch_one(pool)
            .await
    }

    /// Find a recording by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Recording>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM recordings WHERE id = $1");
        sqlx::query_as::<_, Recording>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all recordings, most recently added first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Recording>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM recordings ORDER BY added_at DESC");
        sqlx::query_as::<_, Recording>(&query).fetch_all(pool).await
    }
}
