//! Field-level validation helpers for entry and collection input.
//!
//! Type checks (every field is a string, `collectionId` is an integer) are
//! carried by the parameter structs and enforced when a request body is
//! deserialized. What remains here is the value-level checks, run before
//! any storage mutation is attempted.

use crate::error::CoreError;

/// Require `value` to be a non-empty string.
///
/// Only zero-length values are rejected; whitespace-only input is accepted.
pub fn require_non_empty(field: &str, value: &str) -> Result<(), CoreError> {
    if value.is_empty() {
        return Err(CoreError::Validation(format!("{field} has invalid value")));
    }
    Ok(())
}

/// Validate the mutable fields of an entry.
///
/// Fields are checked in a fixed order so the reported failure is always
/// the first offending field: `description`, then `title`. The remaining
/// text fields may be empty and need no check.
pub fn validate_entry_fields(title: &str, description: &str) -> Result<(), CoreError> {
    require_non_empty("description", description)?;
    require_non_empty("title", title)?;
    Ok(())
}

/// Validate the mutable fields of a collection.
pub fn validate_collection_fields(name: &str) -> Result<(), CoreError> {
    require_non_empty("name", name)
}
