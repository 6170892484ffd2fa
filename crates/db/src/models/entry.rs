//! Entry model, DTOs, and the search filter.

use archive_core::error::CoreError;
use archive_core::types::{DbId, Timestamp};
use archive_core::validation::validate_entry_fields;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `entry` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub donor: String,
    pub year_created: String,
    pub colour: String,
    pub size: String,
    pub collection_id: DbId,
    pub physical_location: String,
    pub media_type: String,
    /// Stored image filename, or the empty string when the entry has none.
    pub image: String,
    pub accession_number: Option<String>,
    pub date_added: Timestamp,
    pub date_last_modified: Timestamp,
}

impl Entry {
    /// Build a record from params. The image is normalized to `""` when absent.
    pub fn from_params(
        id: DbId,
        params: &EntryParams,
        date_added: Timestamp,
        date_last_modified: Timestamp,
    ) -> Self {
        Self {
            id,
            title: params.title.clone(),
            description: params.description.clone(),
            donor: params.donor.clone(),
            year_created: params.year_created.clone(),
            colour: params.colour.clone(),
            size: params.size.clone(),
            collection_id: params.collection_id,
            physical_location: params.physical_location.clone(),
            media_type: params.media_type.clone(),
            image: params.image_or_empty().to_string(),
            accession_number: params.accession_number.clone(),
            date_added,
            date_last_modified,
        }
    }

    /// Whether the entry references a stored image file.
    pub fn has_image(&self) -> bool {
        !self.image.is_empty()
    }
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for creating an entry or replacing all of its mutable fields.
///
/// Every text field is required; all but `title` and `description` may be
/// empty. `image` is never read from a request body: the API layer fills it
/// in after storing an upload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryParams {
    pub title: String,
    pub description: String,
    pub donor: String,
    pub year_created: String,
    pub colour: String,
    pub size: String,
    pub collection_id: DbId,
    pub physical_location: String,
    pub media_type: String,
    #[serde(default)]
    pub accession_number: Option<String>,
    #[serde(skip)]
    pub image: Option<String>,
}

impl EntryParams {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_entry_fields(&self.title, &self.description)
    }

    pub fn image_or_empty(&self) -> &str {
        self.image.as_deref().unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Substring filters for entry search, combined with AND.
///
/// Matching is case-sensitive. An empty field places no constraint on the
/// result; it does not require the record's field to be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchFilter {
    pub title: String,
    pub description: String,
    pub donor: String,
    pub media_type: String,
    /// Matched against the *name* of the entry's collection.
    pub collection: String,
}

impl SearchFilter {
    /// Whether `entry`, owned by a collection called `collection_name`,
    /// satisfies every non-empty filter field.
    pub fn matches(&self, entry: &Entry, collection_name: &str) -> bool {
        entry.title.contains(&self.title)
            && entry.description.contains(&self.description)
            && entry.donor.contains(&self.donor)
            && entry.media_type.contains(&self.media_type)
            && collection_name.contains(&self.collection)
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.description.is_empty()
            && self.donor.is_empty()
            && self.media_type.is_empty()
            && self.collection.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn params() -> EntryParams {
        EntryParams {
            title: "Wedding photograph".to_string(),
            description: "Black and white print".to_string(),
            donor: "J. Smith".to_string(),
            year_created: "1952".to_string(),
            colour: "".to_string(),
            size: "A5".to_string(),
            collection_id: 1,
            physical_location: "Box 4".to_string(),
            media_type: "Photo".to_string(),
            accession_number: None,
            image: None,
        }
    }

    fn entry() -> Entry {
        let now = Utc::now();
        Entry::from_params(1, &params(), now, now)
    }

    #[test]
    fn from_params_normalizes_missing_image() {
        let e = entry();
        assert_eq!(e.image, "");
        assert!(!e.has_image());
    }

    #[test]
    fn validate_rejects_empty_title() {
        let mut p = params();
        p.title.clear();
        assert!(p.validate().is_err());
    }

    #[test]
    fn validate_accepts_empty_optional_fields() {
        let mut p = params();
        p.donor.clear();
        p.media_type.clear();
        p.collection_id = 0;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn deserialize_requires_text_fields() {
        let body = serde_json::json!({ "title": "A", "description": "d", "collectionId": 1 });
        assert!(serde_json::from_value::<EntryParams>(body).is_err());
    }

    #[test]
    fn deserialize_ignores_client_image() {
        let body = serde_json::json!({
            "title": "A", "description": "d", "donor": "", "yearCreated": "",
            "colour": "", "size": "", "collectionId": 0, "physicalLocation": "",
            "mediaType": "", "image": "../../secret.png"
        });
        let p: EntryParams = serde_json::from_value(body).unwrap();
        assert_eq!(p.image, None);
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = SearchFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&entry(), ""));
    }

    #[test]
    fn filter_fields_are_anded() {
        let filter = SearchFilter {
            title: "Wedding".to_string(),
            donor: "Smith".to_string(),
            ..Default::default()
        };
        assert!(filter.matches(&entry(), "Photos"));

        let filter = SearchFilter {
            title: "Wedding".to_string(),
            donor: "Jones".to_string(),
            ..Default::default()
        };
        assert!(!filter.matches(&entry(), "Photos"));
    }

    #[test]
    fn filter_is_case_sensitive() {
        let filter = SearchFilter {
            title: "wedding".to_string(),
            ..Default::default()
        };
        assert!(!filter.matches(&entry(), "Photos"));
    }

    #[test]
    fn filter_matches_collection_name() {
        let filter = SearchFilter {
            collection: "Phot".to_string(),
            ..Default::default()
        };
        assert!(filter.matches(&entry(), "Photos"));
        assert!(!filter.matches(&entry(), "Letters"));
    }
}
