//! Storage layer for the archive catalogue.
//!
//! Everything above this crate talks to an [`ArchiveStore`] trait object.
//! Two realizations exist and must behave identically:
//! - [`MemoryStore`]: transient maps, for tests and throwaway deployments
//! - [`SqliteStore`]: a file-resident SQLite database in WAL mode

use std::path::PathBuf;
use std::sync::Arc;

pub mod error;
pub mod memory;
pub mod models;
pub mod sqlite;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::ArchiveStore;

/// Which storage realization to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Sqlite { path: PathBuf },
}

/// Build the configured store.
pub async fn open_store(backend: &StoreBackend) -> Result<Arc<dyn ArchiveStore>, StoreError> {
    match backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; records will be lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Sqlite { path } => {
            let store = SqliteStore::open(path).await?;
            tracing::info!(path = %path.display(), "SQLite store opened");
            Ok(Arc::new(store))
        }
    }
}
