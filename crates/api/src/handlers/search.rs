//! Tag search handler.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use lens_db::repositories::{FrameRepo, TagRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Tag name to search for. Matched case-insensitively (tags are
    /// stored lowercase).
    pub q: String,
}

/// GET /search?q={tag}
///
/// List the ids of every frame carrying the given tag. 404 when the tag
/// is unknown or no frame carries it.
pub async fn search_by_tag(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let not_found = || AppError::NotFound(format!("No frames tagged '{}'", params.q));

    let tag = TagRepo::find_by_name(&state.pool, &params.q)
        .await?
        .ok_or_else(not_found)?;

    let frame_ids = FrameRepo::ids_by_tag(&state.pool, tag.id).await?;
    if frame_ids.is_empty() {
        return Err(not_found());
    }

    Ok(Json(DataResponse { data: frame_ids }))
}
