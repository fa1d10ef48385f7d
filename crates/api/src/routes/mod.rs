pub mod frames;
pub mod health;
pub mod recordings;
pub mod search;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /frames/next                 next assignment (?previous=frame_id)
/// /frames/{id}                 frame detail
/// /frames/{id}/image           image payload
/// /frames/{id}/annotations     commit annotations + tags (POST)
///
/// /recordings                  list
/// /recordings/{id}             detail
/// /recordings/{id}/feeds       feeds with frame counts
/// /recordings/bags             upload a bag file (POST, multipart)
/// /recordings/videos           upload a video file (POST, multipart)
///
/// /search                      frames by tag (?q=tag)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(frames::router())
        .merge(recordings::router())
        .merge(search::router())
}
