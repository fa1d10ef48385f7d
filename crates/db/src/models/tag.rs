//! Tag model.
//!
//! Tags are deduplicated labels keyed by lowercase name. Frames and feeds
//! reference tags by id, never by copying the name.

use lens_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `tags` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tag {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
}
