use std::sync::Arc;

use archive_db::ArchiveStore;

use crate::images::ImageStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// The record store selected at startup.
    pub store: Arc<dyn ArchiveStore>,
    /// Entry image files on disk.
    pub images: Arc<ImageStore>,
}
