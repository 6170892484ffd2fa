//! Collection model and DTOs.

use archive_core::error::CoreError;
use archive_core::types::{DbId, Timestamp};
use archive_core::validation::validate_collection_fields;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `collection` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: DbId,
    pub name: String,
    pub date_created: Timestamp,
}

/// DTO for creating or renaming a collection.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionParams {
    pub name: String,
}

impl CollectionParams {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_collection_fields(&self.name)
    }
}
