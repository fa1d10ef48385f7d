//! Repository for the `annotations` table.
//!
//! Annotations are append-only: there are no update or delete methods.
//! Inserting a row here is what marks a frame as annotated — the frame
//! table has no completion flag of its own.

use lens_core::types::DbId;
use sqlx::PgPool;

use crate::models::annotation::{Annotation, AnnotationView};

/// Column list for `annotations` queries.
const COLUMNS: &str = "id, frame_id, author_id, data, created_at";

/// Provides append and read access to annotation records.
pub struct AnnotationRepo;

impl AnnotationRepo {
    /// Append an annotation to a frame, attributed to `author_id`.
    pub async fn create(
        pool: &PgPool,
        frame_id: DbId,
        author_id: DbId,
        data: &serde_json::Value,
    ) -> Result<Annotation, sqlx::Error> {
        let query = format!(
            "INSERT INTO annotations (frame_id, author_id, data) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Annotation>(&query)
            .bind(frame_id)
            .bind(author_id)
            .bind(data)
            .fetch_one(pool)
            .await
    }

    /// List a frame's annotations with author names, oldest first.
    pub async fn list_by_frame(
        pool: &PgPool,
        frame_id: DbId,
    ) -> Result<Vec<AnnotationView>, sqlx::Error> {
        sqlx::query_as::<_, AnnotationView>(
            "SELECT u.username AS author, ann.data, ann.created_at \
             FROM annotations ann \
             JOIN users u ON u.id = ann.author_id \
             WHERE ann.frame_id = $1 \
             ORDER BY ann.created_at ASC, ann.id ASC",
        )
        .bind(frame_id)
        .fetch_all(pool)
        .await
    }

    /// Number of annotations on a frame.
    pub async fn count_by_frame(pool: &PgPool, frame_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM annotations WHERE frame_id = $1")
            .bind(frame_id)
            .fetch_one(pool)
            .await
    }
}
