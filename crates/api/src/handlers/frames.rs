//! Handlers for frame assignment, retrieval, and annotation.
//!
//! `next_frame` and `annotate_frame` delegate the actual decision-making
//! to the [`FrameScheduler`](crate::engine::scheduler::FrameScheduler);
//! the handlers only translate between HTTP and the engine.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use sqlx::PgPool;

use lens_core::types::DbId;
use lens_db::models::annotation::AnnotateRequest;
use lens_db::models::feed::FeedSummary;
use lens_db::models::frame::{Frame, FrameView};
use lens_db::models::user::SYSTEM_AUTHOR;
use lens_db::repositories::{AnnotationRepo, FeedRepo, FrameRepo, TagRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /frames/next`.
#[derive(Debug, Deserialize)]
pub struct NextFrameParams {
    /// Id of the frame the annotator just finished with, if any.
    pub previous: Option<DbId>,
}

/// GET /frames/next
///
/// Assign the next annotatable frame to the caller. 404 when every frame
/// is either annotated or currently leased to someone else.
pub async fn next_frame(
    State(state): State<AppState>,
    Query(params): Query<NextFrameParams>,
) -> AppResult<impl IntoResponse> {
    let frame = state
        .scheduler
        .next_frame(params.previous)
        .await?
        .ok_or_else(|| AppError::NotFound("No frame available to annotate".into()))?;

    let view = frame_view(&state.pool, frame).await?;
    Ok(Json(DataResponse { data: view }))
}

/// GET /frames/{id}
pub async fn get_frame(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let frame = FrameRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(lens_core::error::CoreError::NotFound { entity: "Frame", id })?;

    let view = frame_view(&state.pool, frame).await?;
    Ok(Json(DataResponse { data: view }))
}

/// GET /frames/{id}/image
///
/// Serve the frame's image payload with its stored media type.
pub async fn frame_image(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let (bytes, media_type) = FrameRepo::image_data(&state.pool, id)
        .await?
        .ok_or(lens_core::error::CoreError::NotFound { entity: "Frame", id })?;

    Ok(([(header::CONTENT_TYPE, media_type)], bytes))
}

/// POST /frames/{id}/annotations
///
/// Commit annotation records and tags onto a frame, attributed to the
/// built-in system author.
pub async fn annotate_frame(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(req): Json<AnnotateRequest>,
) -> AppResult<impl IntoResponse> {
    let author = UserRepo::get_or_create(&state.pool, SYSTEM_AUTHOR).await?;

    let frame = state
        .scheduler
        .annotate(id, &req.annotations, &req.tags, author.id)
        .await?
        .ok_or(lens_core::error::CoreError::NotFound { entity: "Frame", id })?;

    let view = frame_view(&state.pool, frame).await?;
    Ok(Json(DataResponse { data: view }))
}

/// Assemble the public projection of a frame: feed summary, applied tags,
/// and annotation history.
pub(crate) async fn frame_view(pool: &PgPool, frame: Frame) -> Result<FrameView, AppError> {
    let feed = FeedRepo::find_by_id(pool, frame.feed_id)
        .await?
        .ok_or_else(|| {
            AppError::InternalError(format!("Frame {} references missing feed {}", frame.id, frame.feed_id))
        })?;
    let available_tags = FeedRepo::tag_names(pool, feed.id).await?;
    let tags = TagRepo::frame_tag_names(pool, frame.id).await?;
    let annotations = AnnotationRepo::list_by_frame(pool, frame.id).await?;

    Ok(FrameView {
        id: frame.id,
        feed: FeedSummary {
            id: feed.id,
            recording_id: feed.recording_id,
            stream: feed.stream,
            available_tags,
        },
        seq: frame.seq,
        media_type: frame.media_type,
        width: frame.width,
        height: frame.height,
        tags,
        annotations,
        accessed: frame.accessed,
    })
}
