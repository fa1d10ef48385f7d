//! Repository for the `feeds` and `feed_tags` tables.

use lens_core::types::DbId;
use sqlx::PgPool;

use crate::models::feed::Feed;

/// Column list for `feeds` queries.
const COLUMNS: &str = "id, recording_id, stream, created_at";

/// Provides feed lookup-or-create and observed-tag bookkeeping.
pub struct FeedRepo;

impl FeedRepo {
    /// Look up the feed for `(recording, stream)`, creating it on first
    /// sight. Never duplicates: the pair is unique.
    pub async fn get_or_create(
        pool: &PgPool,
        recording_id: DbId,
        stream: &str,
    ) -> Result<Feed, sqlx::Error> {
        let query = format!(
            "INSERT INTO feeds (recording_id, stream) VALUES ($1, $2) \
             ON CONFLICT (recording_id, stream) DO UPDATE SET stream = EXCLUDED.stream \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Feed>(&query)
            .bind(recording_id)
            .bind(stream)
            .fetch_one(pool)
            .await
    }

    /// Find a feed by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Feed>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM feeds WHERE id = $1");
        sqlx::query_as::<_, Feed>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all feeds belonging to a recording, by stream name.
    pub async fn list_by_recording(
        pool: &PgPool,
        recording_id: DbId,
    ) -> Result<Vec<Feed>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM feeds WHERE recording_id = $1 ORDER BY stream");
        sqlx::query_as::<_, Feed>(&query)
            .bind(recording_id)
            .fetch_all(pool)
            .await
    }

    /// Record a tag in the feed's observed-tag set. Idempotent; the set
    /// only grows.
    pub async fn observe_tag(
        pool: &PgPool,
        feed_id: DbId,
        tag_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO feed_tags (feed_id, tag_id) VALUES ($1, $2) \
             ON CONFLICT (feed_id, tag_id) DO NOTHING",
        )
        .bind(feed_id)
        .bind(tag_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List the names of every tag ever observed on a feed.
    pub async fn tag_names(pool: &PgPool, feed_id: DbId) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT t.name \
             FROM feed_tags ft \
             JOIN tags t ON t.id = ft.tag_id \
             WHERE ft.feed_id = $1 \
             ORDER BY t.name",
        )
        .bind(feed_id)
        .fetch_all(pool)
        .await
    }
}
