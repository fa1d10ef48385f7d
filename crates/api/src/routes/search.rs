//! Route definition for tag search.

use axum::routing::get;
use axum::Router;

use crate::handlers::search;
use crate::state::AppState;

/// ```text
/// GET /search    search_by_tag (?q=tag)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/search", get(search::search_by_tag))
}
