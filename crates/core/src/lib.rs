//! Archive catalogue domain core.
//!
//! Pure logic with no database or HTTP dependencies: identifier and
//! timestamp types, the shared error enum, field validation, pagination
//! arithmetic, and image filename generation.

pub mod error;
pub mod naming;
pub mod pagination;
pub mod types;
pub mod validation;
