//! Shared query parameter types for API handlers.

use archive_db::models::entry::SearchFilter;
use serde::Deserialize;

/// Pagination parameters (`?count=&offset=`).
///
/// Both are optional. Clamping happens in the store: a missing or negative
/// `count` means "all remaining", a missing or negative `offset` means `0`.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub count: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for `GET /search`.
///
/// Every filter field defaults to the empty string, which matches anything.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchParams {
    pub title: String,
    pub description: String,
    pub donor: String,
    pub media_type: String,
    pub collection: String,
    pub count: Option<i64>,
    pub offset: Option<i64>,
}

impl SearchParams {
    /// Split into the store-level filter and the page window.
    pub fn into_parts(self) -> (SearchFilter, PaginationParams) {
        let filter = SearchFilter {
            title: self.title,
            description: self.description,
            donor: self.donor,
            media_type: self.media_type,
            collection: self.collection,
        };
        let page = PaginationParams {
            count: self.count,
            offset: self.offset,
        };
        (filter, page)
    }
}
