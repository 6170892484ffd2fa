//! The storage contract shared by every backend.

use archive_core::error::CoreError;
use archive_core::pagination::ResultPage;
use archive_core::types::{DbId, DEFAULT_COLLECTION_ID};
use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::collection::{Collection, CollectionParams};
use crate::models::entry::{Entry, EntryParams, SearchFilter};

/// CRUD, listing, and search over entries and collections.
///
/// Paginated operations take an optional `count` (default: all remaining)
/// and `offset` (default: `0`), clamped as described in
/// [`PageWindow::clamp`](archive_core::pagination::PageWindow::clamp).
/// Results are ordered by ascending id.
///
/// Lookups by id return `None` for unknown ids; deletes of unknown ids are
/// no-ops. Creates and edits validate their params and check that the
/// referenced collection exists before writing anything.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    // -----------------------------------------------------------------------
    // Entries
    // -----------------------------------------------------------------------

    /// Insert a new entry. `date_added` and `date_last_modified` are equal.
    async fn create_entry(&self, params: &EntryParams) -> Result<Entry, StoreError>;

    /// Replace every mutable field of an entry and refresh `date_last_modified`.
    async fn edit_entry(&self, id: DbId, params: &EntryParams) -> Result<Entry, StoreError>;

    async fn delete_entry(&self, id: DbId) -> Result<(), StoreError>;

    async fn get_entry(&self, id: DbId) -> Result<Option<Entry>, StoreError>;

    async fn get_entries(
        &self,
        count: Option<i64>,
        offset: Option<i64>,
    ) -> Result<ResultPage<Entry>, StoreError>;

    async fn search_entries(
        &self,
        filter: &SearchFilter,
        count: Option<i64>,
        offset: Option<i64>,
    ) -> Result<ResultPage<Entry>, StoreError>;

    async fn get_entries_by_collection(
        &self,
        collection_id: DbId,
        count: Option<i64>,
        offset: Option<i64>,
    ) -> Result<ResultPage<Entry>, StoreError>;

    // -----------------------------------------------------------------------
    // Collections
    // -----------------------------------------------------------------------

    async fn create_collection(&self, params: &CollectionParams)
        -> Result<Collection, StoreError>;

    async fn edit_collection(
        &self,
        id: DbId,
        params: &CollectionParams,
    ) -> Result<Collection, StoreError>;

    /// Reassign every member entry to the default collection, then remove
    /// the collection. Refuses to delete the default collection itself.
    async fn delete_collection(&self, id: DbId) -> Result<(), StoreError>;

    async fn get_collection(&self, id: DbId) -> Result<Option<Collection>, StoreError>;

    async fn get_collections(
        &self,
        count: Option<i64>,
        offset: Option<i64>,
    ) -> Result<ResultPage<Collection>, StoreError>;

    // -----------------------------------------------------------------------
    // Durability
    // -----------------------------------------------------------------------

    /// Force recent writes to durable storage. No-op for transient stores.
    async fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Verify the store is reachable and the default collection is present.
    async fn health_check(&self) -> Result<(), StoreError> {
        match self.get_collection(DEFAULT_COLLECTION_ID).await? {
            Some(_) => Ok(()),
            None => Err(CoreError::Internal("Default collection is missing".into()).into()),
        }
    }
}

/// Reject deletion of the default collection.
pub(crate) fn ensure_collection_deletable(id: DbId) -> Result<(), CoreError> {
    if id == DEFAULT_COLLECTION_ID {
        return Err(CoreError::Conflict(
            "The default collection cannot be deleted".into(),
        ));
    }
    Ok(())
}
