use archive_core::error::CoreError;

/// Error returned by every [`ArchiveStore`](crate::store::ArchiveStore) operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Validation, referential, or conflict failure detected before any write.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Underlying SQLite failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failure at startup.
    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}
