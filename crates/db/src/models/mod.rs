//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` record struct matching the database row
//! - A `Deserialize` params DTO carrying the mutable fields, used for both
//!   create and full-replace edit

pub mod collection;
pub mod entry;
