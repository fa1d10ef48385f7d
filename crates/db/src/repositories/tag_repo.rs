//! Repository for the `tags` and `frame_tags` tables.
//!
//! Tag creation is idempotent: names are normalized to lowercase and a
//! second create with the same name (in any casing) returns the original
//! row. Frame-tag association has set semantics.

use lens_core::types::DbId;
use sqlx::PgPool;

use crate::models::tag::Tag;

/// Column list for `tags` queries.
const COLUMNS: &str = "id, name, created_at";

/// Provides tag resolution and frame-tag associations.
pub struct TagRepo;

impl TagRepo {
    /// Create a tag or return the existing one if the normalized name
    /// already exists.
    ///
    /// Uses `ON CONFLICT` so concurrent creates of the same name are safe.
    pub async fn create_or_get(pool: &PgPool, name: &str) -> Result<Tag, sqlx::Error> {
        let normalized = normalize_tag_name(name);
        let query = format!(
            "INSERT INTO tags (name) VALUES ($1) \
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(&normalized)
            .fetch_one(pool)
            .await
    }

    /// Find a tag by normalized name. Does not create.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Tag>, sqlx::Error> {
        let normalized = normalize_tag_name(name);
        let query = format!("SELECT {COLUMNS} FROM tags WHERE name = $1");
        sqlx::query_as::<_, Tag>(&query)
            .bind(&normalized)
            .fetch_optional(pool)
            .await
    }

    /// Apply a tag to a frame. Idempotent: does nothing if already applied.
    ///
    /// Returns `true` if a new association was created.
    pub async fn apply_to_frame(
        pool: &PgPool,
        frame_id: DbId,
        tag_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO frame_tags (frame_id, tag_id) VALUES ($1, $2) \
             ON CONFLICT (frame_id, tag_id) DO NOTHING",
        )
        .bind(frame_id)
        .bind(tag_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List the tag names applied to a frame, alphabetically.
    pub async fn frame_tag_names(
        pool: &PgPool,
        frame_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT t.name \
             FROM frame_tags ft \
             JOIN tags t ON t.id = ft.tag_id \
             WHERE ft.frame_id = $1 \
             ORDER BY t.name",
        )
        .bind(frame_id)
        .fetch_all(pool)
        .await
    }
}

/// Normalize a tag name: trim whitespace and lowercase.
fn normalize_tag_name(name: &str) -> String {
    name.trim().to_lowercase()
}
