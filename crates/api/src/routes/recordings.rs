//! Route definitions for recording uploads and listings.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::recordings;
use crate::state::AppState;

/// Uploaded bag/video files regularly run to hundreds of megabytes.
const UPLOAD_BODY_LIMIT: usize = 1024 * 1024 * 1024;

/// Recording routes, merged into `/api/v1`.
///
/// ```text
/// GET  /recordings             list_recordings
/// GET  /recordings/{id}        get_recording
/// GET  /recordings/{id}/feeds  list_feeds
/// POST /recordings/bags        upload_bag (multipart)
/// POST /recordings/videos      upload_video (multipart)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recordings", get(recordings::list_recordings))
        .route("/recordings/{id}", get(recordings::get_recording))
        .route("/recordings/{id}/feeds", get(recordings::list_feeds))
        .route(
            "/recordings/bags",
            post(recordings::upload_bag).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/recordings/videos",
            post(recordings::upload_video).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
}
