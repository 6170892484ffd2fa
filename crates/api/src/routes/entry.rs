//! Route definitions for archive entries.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::entry;
use crate::state::AppState;

/// Entry routes, merged at the `/api/v1` root.
///
/// ```text
/// POST   /entry              -> create_entry
/// GET    /entry/{id}         -> get_entry
/// PATCH  /entry/{id}         -> edit_entry
/// DELETE /entry/{id}         -> delete_entry
/// GET    /entries            -> list_entries
/// GET    /search             -> search_entries
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/entry", post(entry::create_entry))
        .route(
            "/entry/{id}",
            get(entry::get_entry)
                .patch(entry::edit_entry)
                .delete(entry::delete_entry),
        )
        .route("/entries", get(entry::list_entries))
        .route("/search", get(entry::search_entries))
}
