//! Handlers for archive entries.
//!
//! Entries are created and edited with `multipart/form-data` so an image can
//! travel with the text fields. Every entry in a response carries its owning
//! collection under `collection`.

use std::collections::HashMap;

use archive_core::error::CoreError;
use archive_core::pagination::ResultPage;
use archive_core::types::DbId;
use archive_db::models::collection::Collection;
use archive_db::models::entry::{Entry, EntryParams};
use axum::body::Bytes;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::images::{settle, PendingImage};
use crate::query::{PaginationParams, SearchParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// An entry together with the collection it belongs to.
#[derive(Debug, Serialize)]
pub struct EntryWithCollection {
    #[serde(flatten)]
    pub entry: Entry,
    pub collection: Option<Collection>,
}

// ---------------------------------------------------------------------------
// Multipart form
// ---------------------------------------------------------------------------

/// Multipart part carrying the image file.
const IMAGE_FIELD: &str = "image";

/// Parsed body of a create or edit request.
struct EntryForm {
    params: EntryParams,
    image: Option<Bytes>,
}

impl EntryForm {
    /// Read every part of the request.
    ///
    /// All text fields except `accessionNumber` are required, though most may
    /// be empty. An empty `image` part counts as no image.
    async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut text: HashMap<String, String> = HashMap::new();
        let mut image = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();
            if name == IMAGE_FIELD {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                image = (!data.is_empty()).then_some(data);
            } else if !name.is_empty() {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                text.insert(name, value);
            }
        }

        let collection_id = take_field(&mut text, "collectionId")?
            .trim()
            .parse::<DbId>()
            .map_err(|_| CoreError::Validation("collectionId has invalid value".into()))?;

        let params = EntryParams {
            title: take_field(&mut text, "title")?,
            description: take_field(&mut text, "description")?,
            donor: take_field(&mut text, "donor")?,
            year_created: take_field(&mut text, "yearCreated")?,
            colour: take_field(&mut text, "colour")?,
            size: take_field(&mut text, "size")?,
            collection_id,
            physical_location: take_field(&mut text, "physicalLocation")?,
            media_type: take_field(&mut text, "mediaType")?,
            accession_number: text.remove("accessionNumber").filter(|v| !v.is_empty()),
            image: None,
        };

        Ok(Self { params, image })
    }
}

fn take_field(text: &mut HashMap<String, String>, field: &str) -> AppResult<String> {
    text.remove(field)
        .ok_or_else(|| AppError::BadRequest(format!("Missing required '{field}' field")))
}

/// Write an uploaded image to disk ahead of the store mutation.
async fn stage_image(state: &AppState, image: Option<Bytes>) -> AppResult<Option<PendingImage>> {
    match image {
        Some(bytes) => Ok(Some(state.images.write(&bytes).await?)),
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Collection enrichment
// ---------------------------------------------------------------------------

async fn with_collection(state: &AppState, entry: Entry) -> AppResult<EntryWithCollection> {
    let collection = state.store.get_collection(entry.collection_id).await?;
    Ok(EntryWithCollection { entry, collection })
}

/// Attach collections to a page of entries, looking each collection up once.
async fn page_with_collections(
    state: &AppState,
    page: ResultPage<Entry>,
) -> AppResult<ResultPage<EntryWithCollection>> {
    let mut collections: HashMap<DbId, Option<Collection>> = HashMap::new();
    for entry in &page.results {
        if !collections.contains_key(&entry.collection_id) {
            let collection = state.store.get_collection(entry.collection_id).await?;
            collections.insert(entry.collection_id, collection);
        }
    }

    Ok(page.map(|entry| EntryWithCollection {
        collection: collections.get(&entry.collection_id).cloned().flatten(),
        entry,
    }))
}

fn entry_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Entry", id })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/entry
pub async fn create_entry(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let EntryForm { mut params, image } = EntryForm::read(multipart).await?;
    params.validate()?;

    let pending = stage_image(&state, image).await?;
    params.image = pending.as_ref().map(|p| p.filename().to_string());

    let entry = settle(pending, state.store.create_entry(&params).await).await?;

    tracing::info!(entry_id = entry.id, has_image = entry.has_image(), "Entry created");

    let data = with_collection(&state, entry).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// GET /api/v1/entry/{id}
pub async fn get_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let entry = state
        .store
        .get_entry(entry_id)
        .await?
        .ok_or_else(|| entry_not_found(entry_id))?;

    let data = with_collection(&state, entry).await?;
    Ok(Json(DataResponse { data }))
}

/// PATCH /api/v1/entry/{id}
///
/// Replaces every mutable field. A request without an image clears the
/// entry's image. The previous image file is removed once the edit is stored.
/// Concurrent edits and deletes take turns so that each superseded file is
/// the one the stored record actually referenced.
pub async fn edit_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let EntryForm { mut params, image } = EntryForm::read(multipart).await?;
    params.validate()?;

    let _replacing = state.images.lock_replacements().await;

    let previous = state
        .store
        .get_entry(entry_id)
        .await?
        .ok_or_else(|| entry_not_found(entry_id))?;

    let pending = stage_image(&state, image).await?;
    params.image = pending.as_ref().map(|p| p.filename().to_string());

    let entry = settle(pending, state.store.edit_entry(entry_id, &params).await).await?;

    if previous.has_image() && previous.image != entry.image {
        state.images.remove(&previous.image).await;
    }

    tracing::info!(entry_id, has_image = entry.has_image(), "Entry updated");

    let data = with_collection(&state, entry).await?;
    Ok(Json(DataResponse { data }))
}

/// DELETE /api/v1/entry/{id}
pub async fn delete_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let _replacing = state.images.lock_replacements().await;

    let entry = state
        .store
        .get_entry(entry_id)
        .await?
        .ok_or_else(|| entry_not_found(entry_id))?;

    state.store.delete_entry(entry_id).await?;

    if entry.has_image() {
        state.images.remove(&entry.image).await;
    }

    tracing::info!(entry_id, "Entry deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/entries
pub async fn list_entries(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let page = state.store.get_entries(params.count, params.offset).await?;

    let data = page_with_collections(&state, page).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/search
///
/// Case-sensitive substring match on title, description, donor, media type,
/// and collection name. Empty filter fields match everything.
pub async fn search_entries(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let (filter, window) = params.into_parts();
    let page = state
        .store
        .search_entries(&filter, window.count, window.offset)
        .await?;

    tracing::debug!(total = page.total_result_count, "Entry search");

    let data = page_with_collections(&state, page).await?;
    Ok(Json(DataResponse { data }))
}
