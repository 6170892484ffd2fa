#![allow(dead_code)]

use archive_core::types::DbId;
use archive_db::models::collection::CollectionParams;
use archive_db::models::entry::EntryParams;
use archive_db::SqliteStore;
use tempfile::TempDir;

/// A SQLite store in a fresh temporary directory.
///
/// The directory is returned alongside the store and must be kept alive for
/// as long as the store is used.
pub async fn sqlite_store() -> (SqliteStore, TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = SqliteStore::open(dir.path().join("archive.sqlite"))
        .await
        .expect("open sqlite store");
    (store, dir)
}

pub fn new_collection(name: &str) -> CollectionParams {
    CollectionParams {
        name: name.to_string(),
    }
}

/// Entry params with every optional text field empty.
pub fn new_entry(title: &str, description: &str, collection_id: DbId) -> EntryParams {
    EntryParams {
        title: title.to_string(),
        description: description.to_string(),
        donor: String::new(),
        year_created: String::new(),
        colour: String::new(),
        size: String::new(),
        collection_id,
        physical_location: String::new(),
        media_type: String::new(),
        accession_number: None,
        image: None,
    }
}

/// Entry params with every field populated.
pub fn full_entry(title: &str, collection_id: DbId) -> EntryParams {
    EntryParams {
        title: title.to_string(),
        description: format!("{title} description"),
        donor: "Estate of M. Hart".to_string(),
        year_created: "1931".to_string(),
        colour: "Sepia".to_string(),
        size: "12x8cm".to_string(),
        collection_id,
        physical_location: "Shelf B, Box 2".to_string(),
        media_type: "Photograph".to_string(),
        accession_number: Some("ACC-1931-004".to_string()),
        image: Some("0190a1b2c3d4e5f60718293a4b5c6d7e.png".to_string()),
    }
}
