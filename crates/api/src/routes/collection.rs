//! Route definitions for collections.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::collection;
use crate::state::AppState;

/// Collection routes, merged at the `/api/v1` root.
///
/// ```text
/// POST   /collection                -> create_collection
/// GET    /collection/{id}           -> get_collection
/// PATCH  /collection/{id}           -> edit_collection
/// DELETE /collection/{id}           -> delete_collection
/// GET    /collection/{id}/entries   -> list_collection_entries
/// GET    /collections               -> list_collections
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/collection", post(collection::create_collection))
        .route(
            "/collection/{id}",
            get(collection::get_collection)
                .patch(collection::edit_collection)
                .delete(collection::delete_collection),
        )
        .route(
            "/collection/{id}/entries",
            get(collection::list_collection_entries),
        )
        .route("/collections", get(collection::list_collections))
}
