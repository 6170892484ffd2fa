/// All record identifiers are SQLite INTEGER primary keys.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Id of the permanent fallback collection. Always present, never deleted.
pub const DEFAULT_COLLECTION_ID: DbId = 0;

/// Name the default collection is (re)set to on every startup.
pub const DEFAULT_COLLECTION_NAME: &str = "None";
