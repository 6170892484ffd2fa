//! Periodic store flush.
//!
//! Spawns a loop that asks the store to move recent writes into durable
//! storage on a fixed interval. For SQLite this checkpoints the write-ahead
//! log; for the in-memory store it does nothing.

use std::sync::Arc;
use std::time::Duration;

use archive_db::ArchiveStore;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Run the flush loop until `cancel` is triggered.
///
/// The first flush happens one full `every` after start. Failures are
/// logged and the loop keeps going.
pub async fn run(store: Arc<dyn ArchiveStore>, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Durability flush job started");

    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Durability flush job stopping");
                break;
            }
            _ = interval.tick() => {
                match store.flush().await {
                    Ok(()) => tracing::debug!("Durability flush: store flushed"),
                    Err(e) => tracing::error!(error = %e, "Durability flush: flush failed"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use archive_core::pagination::ResultPage;
    use archive_core::types::DbId;
    use archive_db::models::collection::{Collection, CollectionParams};
    use archive_db::models::entry::{Entry, EntryParams, SearchFilter};
    use archive_db::{MemoryStore, StoreError};
    use async_trait::async_trait;

    use super::*;

    /// Delegates to a [`MemoryStore`] and counts flushes.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        flushes: AtomicUsize,
    }

    #[async_trait]
    impl ArchiveStore for CountingStore {
        async fn create_entry(&self, params: &EntryParams) -> Result<Entry, StoreError> {
            self.inner.create_entry(params).await
        }
        async fn edit_entry(&self, id: DbId, params: &EntryParams) -> Result<Entry, StoreError> {
            self.inner.edit_entry(id, params).await
        }
        async fn delete_entry(&self, id: DbId) -> Result<(), StoreError> {
            self.inner.delete_entry(id).await
        }
        async fn get_entry(&self, id: DbId) -> Result<Option<Entry>, StoreError> {
            self.inner.get_entry(id).await
        }
        async fn get_entries(
            &self,
            count: Option<i64>,
            offset: Option<i64>,
        ) -> Result<ResultPage<Entry>, StoreError> {
            self.inner.get_entries(count, offset).await
        }
        async fn search_entries(
            &self,
            filter: &SearchFilter,
            count: Option<i64>,
            offset: Option<i64>,
        ) -> Result<ResultPage<Entry>, StoreError> {
            self.inner.search_entries(filter, count, offset).await
        }
        async fn get_entries_by_collection(
            &self,
            collection_id: DbId,
            count: Option<i64>,
            offset: Option<i64>,
        ) -> Result<ResultPage<Entry>, StoreError> {
            self.inner
                .get_entries_by_collection(collection_id, count, offset)
                .await
        }
        async fn create_collection(
            &self,
            params: &CollectionParams,
        ) -> Result<Collection, StoreError> {
            self.inner.create_collection(params).await
        }
        async fn edit_collection(
            &self,
            id: DbId,
            params: &CollectionParams,
        ) -> Result<Collection, StoreError> {
            self.inner.edit_collection(id, params).await
        }
        async fn delete_collection(&self, id: DbId) -> Result<(), StoreError> {
            self.inner.delete_collection(id).await
        }
        async fn get_collection(&self, id: DbId) -> Result<Option<Collection>, StoreError> {
            self.inner.get_collection(id).await
        }
        async fn get_collections(
            &self,
            count: Option<i64>,
            offset: Option<i64>,
        ) -> Result<ResultPage<Collection>, StoreError> {
            self.inner.get_collections(count, offset).await
        }
        async fn flush(&self) -> Result<(), StoreError> {
            self.flushes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn flushes_on_each_tick_until_cancelled() {
        let store = Arc::new(CountingStore::default());
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(
            store.clone(),
            Duration::from_secs(60),
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(store.flushes.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(100)).await;
        assert_eq!(store.flushes.load(Ordering::SeqCst), 2);

        cancel.cancel();
        handle.await.unwrap();
    }
}
