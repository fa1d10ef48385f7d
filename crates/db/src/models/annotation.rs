//! Annotation model and DTOs.

use lens_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `annotations` table. Immutable after creation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Annotation {
    pub id: DbId,
    pub frame_id: DbId,
    pub author_id: DbId,
    pub data: serde_json::Value,
    pub created_at: Timestamp,
}

/// Annotation joined with its author's name, for frame views.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AnnotationView {
    pub author: String,
    pub data: serde_json::Value,
    pub created_at: Timestamp,
}

/// Request body for committing annotations and tags onto a frame.
#[derive(Debug, Clone, Deserialize)]
pub struct AnnotateRequest {
    /// Free-form structured annotation payloads, one record created per
    /// element.
    #[serde(default)]
    pub annotations: Vec<serde_json::Value>,
    /// Tag names; folded to lowercase and deduplicated on apply.
    #[serde(default)]
    pub tags: Vec<String>,
}
