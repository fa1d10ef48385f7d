//! Handlers for recording uploads and listings.
//!
//! Uploads are accepted, written to a spool file, and acknowledged
//! immediately; frame extraction runs in a spawned background task so a
//! multi-gigabyte bag does not hold the request open.

use std::path::{Path as FsPath, PathBuf};

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use uuid::Uuid;

use lens_core::types::{DbId, Timestamp};
use lens_db::models::recording::{CreateRecording, RecordingKind};
use lens_db::repositories::{FeedRepo, FrameRepo, RecordingRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// A feed with its frame count, for the recording detail listing.
#[derive(Debug, Serialize)]
pub struct FeedListing {
    pub id: DbId,
    pub stream: String,
    pub frames: i64,
    pub available_tags: Vec<String>,
}

/// POST /recordings/bags
pub async fn upload_bag(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    upload_recording(state, multipart, RecordingKind::Bag).await
}

/// POST /recordings/videos
pub async fn upload_video(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    upload_recording(state, multipart, RecordingKind::Video).await
}

/// GET /recordings
pub async fn list_recordings(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let recordings = RecordingRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: recordings }))
}

/// GET /recordings/{id}
pub async fn get_recording(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let recording = RecordingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(lens_core::error::CoreError::NotFound { entity: "Recording", id })?;
    Ok(Json(DataResponse { data: recording }))
}

/// GET /recordings/{id}/feeds
pub async fn list_feeds(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    RecordingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(lens_core::error::CoreError::NotFound { entity: "Recording", id })?;

    let feeds = FeedRepo::list_by_recording(&state.pool, id).await?;
    let mut listings = Vec::with_capacity(feeds.len());
    for feed in feeds {
        let frames = FrameRepo::count_by_feed(&state.pool, feed.id).await?;
        let available_tags = FeedRepo::tag_names(&state.pool, feed.id).await?;
        listings.push(FeedListing {
            id: feed.id,
            stream: feed.stream,
            frames,
            available_tags,
        });
    }
    Ok(Json(DataResponse { data: listings }))
}

/// Shared upload path for both recording kinds.
///
/// Parses the multipart form, persists the recording row, spools the file
/// to disk, responds 201, and spawns ingestion.
async fn upload_recording(
    state: AppState,
    mut multipart: Multipart,
    kind: RecordingKind,
) -> AppResult<impl IntoResponse> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut name: Option<String> = None;
    let mut location: Option<String> = None;
    let mut conditions: Vec<String> = Vec::new();
    let mut recorded_at: Option<Timestamp> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "file" => {
                file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;
                file_bytes = Some(bytes.to_vec());
            }
            "name" => name = Some(read_text_field(field).await?),
            "location" => location = Some(read_text_field(field).await?),
            "conditions" => {
                // Space-separated free text, e.g. "sunny murky".
                conditions = read_text_field(field)
                    .await?
                    .split_whitespace()
                    .map(str::to_string)
                    .collect();
            }
            "recorded" => {
                let raw = read_text_field(field).await?;
                recorded_at = Some(parse_recorded(&raw)?);
            }
            other => {
                tracing::debug!(field = other, "Ignoring unknown upload field");
            }
        }
    }

    let file_bytes =
        file_bytes.ok_or_else(|| AppError::BadRequest("Missing 'file' field".into()))?;
    let input = CreateRecording {
        name: name.ok_or_else(|| AppError::BadRequest("Missing 'name' field".into()))?,
        location: location
            .ok_or_else(|| AppError::BadRequest("Missing 'location' field".into()))?,
        conditions,
        recorded_at: recorded_at
            .ok_or_else(|| AppError::BadRequest("Missing 'recorded' field".into()))?,
    };

    let spool_path = spool_file_path(file_name.as_deref());
    tokio::fs::write(&spool_path, &file_bytes)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to spool upload: {e}")))?;

    let recording = match RecordingRepo::create(&state.pool, kind, &input).await {
        Ok(recording) => recording,
        Err(e) => {
            // Nothing will ever ingest the spooled file now.
            if let Err(rm) = tokio::fs::remove_file(&spool_path).await {
                tracing::warn!(path = %spool_path.display(), error = %rm, "Failed to remove spool file");
            }
            return Err(e.into());
        }
    };
    tracing::info!(
        recording_id = recording.id,
        kind = kind.as_str(),
        bytes = file_bytes.len(),
        "Recording accepted, ingestion queued",
    );

    spawn_ingestion(state.pool.clone(), recording.id, spool_path, kind);

    Ok((StatusCode::CREATED, Json(DataResponse { data: recording })))
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read form field: {e}")))
}

/// Parse the `recorded` form field. Accepts RFC 3339 or the plain
/// `YYYY-MM-DDTHH:MM` value an HTML datetime-local input produces.
fn parse_recorded(raw: &str) -> Result<Timestamp, AppError> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    Err(AppError::BadRequest(format!(
        "Invalid 'recorded' timestamp: {raw}"
    )))
}

/// A unique spool path in the system temp directory, preserving the
/// upload's extension so the extractor can tell bags from videos.
fn spool_file_path(original_name: Option<&str>) -> PathBuf {
    let extension = original_name
        .and_then(|n| FsPath::new(n).extension())
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    std::env::temp_dir().join(format!("lens-upload-{}{extension}", Uuid::new_v4()))
}

/// Run ingestion in the background and clean up the spool file after.
fn spawn_ingestion(pool: lens_db::DbPool, recording_id: DbId, path: PathBuf, kind: RecordingKind) {
    tokio::spawn(async move {
        match lens_pipeline::ingest_file(&pool, recording_id, &path, kind).await {
            Ok(report) => {
                tracing::info!(
                    recording_id,
                    frames_written = report.frames_written,
                    frames_skipped = report.frames_skipped,
                    feeds = report.feeds,
                    "Ingestion complete",
                );
            }
            Err(e) => {
                tracing::error!(recording_id, error = %e, "Ingestion failed");
            }
        }
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove spool file");
        }
    });
}
