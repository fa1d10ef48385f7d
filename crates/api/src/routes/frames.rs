//! Route definitions for frame assignment and annotation.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::frames;
use crate::state::AppState;

/// Frame routes, merged into `/api/v1`.
///
/// ```text
/// GET  /frames/next               next_frame (?previous)
/// GET  /frames/{id}               get_frame
/// GET  /frames/{id}/image         frame_image
/// POST /frames/{id}/annotations   annotate_frame
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/frames/next", get(frames::next_frame))
        .route("/frames/{id}", get(frames::get_frame))
        .route("/frames/{id}/image", get(frames::frame_image))
        .route("/frames/{id}/annotations", post(frames::annotate_frame))
}
