//! Feed model.

use lens_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `feeds` table: one logical stream of frames within a
/// recording. Immutable after creation except for its observed-tag set.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Feed {
    pub id: DbId,
    pub recording_id: DbId,
    pub stream: String,
    pub created_at: Timestamp,
}

/// Public projection of a feed, embedded in [`FrameView`].
///
/// [`FrameView`]: crate::models::frame::FrameView
#[derive(Debug, Clone, Serialize)]
pub struct FeedSummary {
    pub id: DbId,
    pub recording_id: DbId,
    pub stream: String,
    /// Names of every tag ever seen on this feed.
    pub available_tags: Vec<String>,
}
