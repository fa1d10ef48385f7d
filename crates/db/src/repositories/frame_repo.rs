//! Repository for the `frames` table.
//!
//! The eligibility predicate lives here: a frame is assignable iff it has
//! no annotations and its lease timestamp is absent or older than the
//! caller-supplied cutoff. The `next_eligible_*` queries and the `touch`
//! that follows a successful one must run inside the scheduler's
//! assignment-lock critical section; the repository itself takes no locks.

use lens_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::frame::Frame;

/// Column list for `frames` queries (image payload excluded).
const COLUMNS: &str = "id, feed_id, seq, media_type, width, height, accessed, created_at";

/// Eligibility predicate: unannotated and lease absent or expired.
/// The cutoff timestamp binds as `$1` in every query that embeds this.
const ELIGIBLE: &str = "NOT EXISTS (SELECT 1 FROM annotations a WHERE a.frame_id = frames.id) \
     AND (accessed IS NULL OR accessed < $1)";

/// Provides frame persistence and the assignment candidate queries.
pub struct FrameRepo;

impl FrameRepo {
    /// Insert an extracted frame, returning the created row (without the
    /// payload). Fails on a duplicate `(feed, seq)` pair.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &PgPool,
        feed_id: DbId,
        seq: i32,
        data: &[u8],
        media_type: &str,
        width: i32,
        height: i32,
    ) -> Result<Frame, sqlx::Error> {
        let query = format!(
            "INSERT INTO frames (feed_id, seq, data, media_type, width, height) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Frame>(&query)
            .bind(feed_id)
            .bind(seq)
            .bind(data)
            .bind(media_type)
            .bind(width)
            .bind(height)
            .fetch_one(pool)
            .await
    }

    /// Find a frame by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Frame>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM frames WHERE id = $1");
        sqlx::query_as::<_, Frame>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch a frame's image payload and media type.
    pub async fn image_data(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<(Vec<u8>, String)>, sqlx::Error> {
        sqlx::query_as::<_, (Vec<u8>, String)>(
            "SELECT data, media_type FROM frames WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Refresh a frame's lease timestamp, returning the updated row.
    pub async fn touch(
        pool: &PgPool,
        id: DbId,
        now: Timestamp,
    ) -> Result<Option<Frame>, sqlx::Error> {
        let query = format!("UPDATE frames SET accessed = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Frame>(&query)
            .bind(id)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// The eligible frame in `feed_id` with the smallest sequence number
    /// strictly greater than `after_seq`, if any.
    pub async fn next_eligible_in_feed(
        pool: &PgPool,
        feed_id: DbId,
        after_seq: i32,
        cutoff: Timestamp,
    ) -> Result<Option<Frame>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM frames \
             WHERE {ELIGIBLE} AND feed_id = $2 AND seq > $3 \
             ORDER BY seq ASC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Frame>(&query)
            .bind(cutoff)
            .bind(feed_id)
            .bind(after_seq)
            .fetch_optional(pool)
            .await
    }

    /// Any eligible frame, across all feeds.
    ///
    /// Ordered by `(feed_id, seq)` so the same query run twice without an
    /// intervening mutation yields the same candidate.
    pub async fn next_eligible_any(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<Option<Frame>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM frames \
             WHERE {ELIGIBLE} \
             ORDER BY feed_id ASC, seq ASC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Frame>(&query)
            .bind(cutoff)
            .fetch_optional(pool)
            .await
    }

    /// Ids of all frames carrying the given tag, in `(feed, seq)` order.
    pub async fn ids_by_tag(pool: &PgPool, tag_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT f.id \
             FROM frame_tags ft \
             JOIN frames f ON f.id = ft.frame_id \
             WHERE ft.tag_id = $1 \
             ORDER BY f.feed_id, f.seq",
        )
        .bind(tag_id)
        .fetch_all(pool)
        .await
    }

    /// Highest sequence number in a feed, or `None` for an empty feed.
    pub async fn max_seq(pool: &PgPool, feed_id: DbId) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<i32>>("SELECT MAX(seq) FROM frames WHERE feed_id = $1")
            .bind(feed_id)
            .fetch_one(pool)
            .await
    }

    /// Number of frames in a feed.
    pub async fn count_by_feed(pool: &PgPool, feed_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM frames WHERE feed_id = $1")
            .bind(feed_id)
            .fetch_one(pool)
            .await
    }
}
