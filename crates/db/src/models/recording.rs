//! Recording (uploaded bag or video) model and DTOs.

use lens_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// What kind of source file a recording was ingested from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingKind {
    Bag,
    Video,
}

impl RecordingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bag => "bag",
            Self::Video => "video",
        }
    }
}

/// A row from the `recordings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Recording {
    pub id: DbId,
    pub name: String,
    pub kind: String,
    pub location: String,
    pub conditions: Vec<String>,
    pub recorded_at: Timestamp,
    pub added_at: Timestamp,
}

/// Input for creating a recording, parsed from the upload form fields.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecording {
    pub name: String,
    pub location: String,
    /// Free-text conditions (e.g. "sunny murky 2-knot-current").
    #[serde(default)]
    pub conditions: Vec<String>,
    pub recorded_at: Timestamp,
}
