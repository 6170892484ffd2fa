//! Archive catalogue API server library.
//!
//! Exposes the building blocks (config, state, error handling, image storage,
//! routes) so integration tests and the binary entrypoint can both use them.

pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod images;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
