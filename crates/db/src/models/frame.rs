//! Frame model and view projection.

use lens_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::annotation::AnnotationView;
use crate::models::feed::FeedSummary;

/// A row from the `frames` table, minus the image payload.
///
/// The payload is large and only the image endpoint needs it, so every
/// other query selects this projection and the bytes are fetched
/// separately via `FrameRepo::image_data`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Frame {
    pub id: DbId,
    pub feed_id: DbId,
    pub seq: i32,
    pub media_type: String,
    pub width: i32,
    pub height: i32,
    /// Lease timestamp. `None` means the frame has never been offered to
    /// an annotator.
    pub accessed: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Public projection of a frame: what `GET /frames/next` and the
/// annotation commit return.
#[derive(Debug, Clone, Serialize)]
pub struct FrameView {
    pub id: DbId,
    pub feed: FeedSummary,
    pub seq: i32,
    pub media_type: String,
    pub width: i32,
    pub height: i32,
    pub tags: Vec<String>,
    pub annotations: Vec<AnnotationView>,
    pub accessed: Option<Timestamp>,
}
