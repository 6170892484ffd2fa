//! Handlers for collections.

use archive_core::error::CoreError;
use archive_core::types::{DbId, DEFAULT_COLLECTION_ID};
use archive_db::models::collection::CollectionParams;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::handlers::entry::EntryWithCollection;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn collection_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Collection",
        id,
    })
}

/// POST /api/v1/collection
pub async fn create_collection(
    State(state): State<AppState>,
    payload: Result<Json<CollectionParams>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload?;
    let collection = state.store.create_collection(&input).await?;

    tracing::info!(collection_id = collection.id, "Collection created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: collection })))
}

/// GET /api/v1/collection/{id}
pub async fn get_collection(
    State(state): State<AppState>,
    Path(collection_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let collection = state
        .store
        .get_collection(collection_id)
        .await?
        .ok_or_else(|| collection_not_found(collection_id))?;

    Ok(Json(DataResponse { data: collection }))
}

/// PATCH /api/v1/collection/{id}
pub async fn edit_collection(
    State(state): State<AppState>,
    Path(collection_id): Path<DbId>,
    payload: Result<Json<CollectionParams>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload?;
    let collection = state.store.edit_collection(collection_id, &input).await?;

    tracing::info!(collection_id, "Collection renamed");

    Ok(Json(DataResponse { data: collection }))
}

/// DELETE /api/v1/collection/{id}
///
/// Member entries move to the default collection. The default collection
/// itself cannot be deleted.
pub async fn delete_collection(
    State(state): State<AppState>,
    Path(collection_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if collection_id == DEFAULT_COLLECTION_ID {
        return Err(AppError::BadRequest(
            "The default collection cannot be deleted".into(),
        ));
    }

    state.store.delete_collection(collection_id).await?;

    tracing::info!(collection_id, "Collection deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/collection/{id}/entries
pub async fn list_collection_entries(
    State(state): State<AppState>,
    Path(collection_id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let collection = state
        .store
        .get_collection(collection_id)
        .await?
        .ok_or_else(|| collection_not_found(collection_id))?;

    let page = state
        .store
        .get_entries_by_collection(collection_id, params.count, params.offset)
        .await?;

    let data = page.map(|entry| EntryWithCollection {
        entry,
        collection: Some(collection.clone()),
    });
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/collections
pub async fn list_collections(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let page = state
        .store
        .get_collections(params.count, params.offset)
        .await?;

    Ok(Json(DataResponse { data: page }))
}
