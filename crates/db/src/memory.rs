//! Transient store holding every record in process memory.

use std::collections::BTreeMap;

use archive_core::error::CoreError;
use archive_core::pagination::ResultPage;
use archive_core::types::{DbId, DEFAULT_COLLECTION_ID, DEFAULT_COLLECTION_NAME};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::collection::{Collection, CollectionParams};
use crate::models::entry::{Entry, EntryParams, SearchFilter};
use crate::store::{ensure_collection_deletable, ArchiveStore};

/// In-memory [`ArchiveStore`].
///
/// Records live in id-keyed `BTreeMap`s. Ids come from monotonically
/// increasing counters, so map order is insertion order. All mutations take
/// the write lock for their whole read-modify-write sequence.
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

struct Inner {
    last_entry_id: DbId,
    last_collection_id: DbId,
    entries: BTreeMap<DbId, Entry>,
    collections: BTreeMap<DbId, Collection>,
}

impl Inner {
    fn require_collection(&self, id: DbId) -> Result<(), CoreError> {
        if self.collections.contains_key(&id) {
            Ok(())
        } else {
            Err(CoreError::UnknownReference {
                entity: "Collection",
                id,
            })
        }
    }
}

impl MemoryStore {
    /// Create an empty store containing only the default collection.
    pub fn new() -> Self {
        let mut collections = BTreeMap::new();
        collections.insert(
            DEFAULT_COLLECTION_ID,
            Collection {
                id: DEFAULT_COLLECTION_ID,
                name: DEFAULT_COLLECTION_NAME.to_string(),
                date_created: Utc::now(),
            },
        );

        Self {
            inner: RwLock::new(Inner {
                last_entry_id: 0,
                last_collection_id: DEFAULT_COLLECTION_ID,
                entries: BTreeMap::new(),
                collections,
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArchiveStore for MemoryStore {
    async fn create_entry(&self, params: &EntryParams) -> Result<Entry, StoreError> {
        params.validate()?;

        let mut inner = self.inner.write().await;
        inner.require_collection(params.collection_id)?;

        inner.last_entry_id += 1;
        let now = Utc::now();
        let entry = Entry::from_params(inner.last_entry_id, params, now, now);
        inner.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn edit_entry(&self, id: DbId, params: &EntryParams) -> Result<Entry, StoreError> {
        params.validate()?;

        let mut inner = self.inner.write().await;
        let date_added = inner
            .entries
            .get(&id)
            .map(|e| e.date_added)
            .ok_or(CoreError::NotFound { entity: "Entry", id })?;
        inner.require_collection(params.collection_id)?;

        let entry = Entry::from_params(id, params, date_added, Utc::now());
        inner.entries.insert(id, entry.clone());
        Ok(entry)
    }

    async fn delete_entry(&self, id: DbId) -> Result<(), StoreError> {
        self.inner.write().await.entries.remove(&id);
        Ok(())
    }

    async fn get_entry(&self, id: DbId) -> Result<Option<Entry>, StoreError> {
        Ok(self.inner.read().await.entries.get(&id).cloned())
    }

    async fn get_entries(
        &self,
        count: Option<i64>,
        offset: Option<i64>,
    ) -> Result<ResultPage<Entry>, StoreError> {
        let inner = self.inner.read().await;
        let all = inner.entries.values().cloned().collect();
        Ok(ResultPage::from_slice(all, count, offset))
    }

    async fn search_entries(
        &self,
        filter: &SearchFilter,
        count: Option<i64>,
        offset: Option<i64>,
    ) -> Result<ResultPage<Entry>, StoreError> {
        let inner = self.inner.read().await;
        let matching = inner
            .entries
            .values()
            .filter(|e| {
                inner
                    .collections
                    .get(&e.collection_id)
                    .is_some_and(|c| filter.matches(e, &c.name))
            })
            .cloned()
            .collect();
        Ok(ResultPage::from_slice(matching, count, offset))
    }

    async fn get_entries_by_collection(
        &self,
        collection_id: DbId,
        count: Option<i64>,
        offset: Option<i64>,
    ) -> Result<ResultPage<Entry>, StoreError> {
        let inner = self.inner.read().await;
        let matching = inner
            .entries
            .values()
            .filter(|e| e.collection_id == collection_id)
            .cloned()
            .collect();
        Ok(ResultPage::from_slice(matching, count, offset))
    }

    async fn create_collection(
        &self,
        params: &CollectionParams,
    ) -> Result<Collection, StoreError> {
        params.validate()?;

        let mut inner = self.inner.write().await;
        inner.last_collection_id += 1;
        let collection = Collection {
            id: inner.last_collection_id,
            name: params.name.clone(),
            date_created: Utc::now(),
        };
        inner.collections.insert(collection.id, collection.clone());
        Ok(collection)
    }

    async fn edit_collection(
        &self,
        id: DbId,
        params: &CollectionParams,
    ) -> Result<Collection, StoreError> {
        params.validate()?;

        let mut inner = self.inner.write().await;
        let collection = inner.collections.get_mut(&id).ok_or(CoreError::NotFound {
            entity: "Collection",
            id,
        })?;
        collection.name = params.name.clone();
        Ok(collection.clone())
    }

    async fn delete_collection(&self, id: DbId) -> Result<(), StoreError> {
        ensure_collection_deletable(id)?;

        let mut inner = self.inner.write().await;
        for entry in inner.entries.values_mut() {
            if entry.collection_id == id {
                entry.collection_id = DEFAULT_COLLECTION_ID;
            }
        }
        inner.collections.remove(&id);
        Ok(())
    }

    async fn get_collection(&self, id: DbId) -> Result<Option<Collection>, StoreError> {
        Ok(self.inner.read().await.collections.get(&id).cloned())
    }

    async fn get_collections(
        &self,
        count: Option<i64>,
        offset: Option<i64>,
    ) -> Result<ResultPage<Collection>, StoreError> {
        let inner = self.inner.read().await;
        let all = inner.collections.values().cloned().collect();
        Ok(ResultPage::from_slice(all, count, offset))
    }
}
