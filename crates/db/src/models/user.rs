//! Annotation author model.

use lens_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `users` table.
///
/// There is no authentication in this service; annotations are attributed
/// to a fixed system author resolved by name at commit time.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub created_at: Timestamp,
}

/// Username of the built-in system author.
pub const SYSTEM_AUTHOR: &str = "robotics";
