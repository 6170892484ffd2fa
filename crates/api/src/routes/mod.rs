pub mod collection;
pub mod entry;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /entry                                           create (multipart)
/// /entry/{id}                                      get, edit (multipart), delete
/// /entries                                         list (?count, offset)
/// /search                                          search (?title, description, donor,
///                                                  mediaType, collection, count, offset)
///
/// /collection                                      create
/// /collection/{id}                                 get, rename, delete
/// /collection/{id}/entries                         list members (?count, offset)
/// /collections                                     list (?count, offset)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(entry::router())
        .merge(collection::router())
}
