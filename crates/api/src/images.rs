//! On-disk storage for entry images.
//!
//! An entry's `image` field holds a bare filename under the configured image
//! directory. The file lifecycle is tied to the record lifecycle:
//!
//! - An upload is written and fsynced *before* the record is created or
//!   edited, as a [`PendingImage`].
//! - If the store mutation fails the pending file is discarded; if it
//!   succeeds the file is committed (see [`settle`]).
//! - A file replaced or orphaned by a successful edit or delete is removed
//!   afterwards with [`ImageStore::remove`].
//!
//! Removal is best-effort: failures are logged and never returned.
//!
//! Edits and deletes decide which file to remove from the record they read
//! before mutating it, so they run under [`ImageStore::lock_replacements`].

use std::io;
use std::path::{Path, PathBuf};

use archive_core::naming::{generate_image_filename, is_safe_image_filename};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, MutexGuard};

/// Name of the file written and removed by [`ImageStore::prepare`].
const WRITE_CHECK_FILENAME: &str = ".write-check";

/// The image directory and the operations on files inside it.
#[derive(Debug)]
pub struct ImageStore {
    dir: PathBuf,
    replacements: Mutex<()>,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            replacements: Mutex::new(()),
        }
    }

    /// Serialize read-mutate-cleanup sequences that may replace or orphan an
    /// existing image, so each superseded file is removed exactly once.
    pub async fn lock_replacements(&self) -> MutexGuard<'_, ()> {
        self.replacements.lock().await
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if missing and confirm it is writable.
    pub async fn prepare(&self) -> io::Result<()> {
        if fs::metadata(&self.dir).await.is_err() {
            tracing::warn!(dir = %self.dir.display(), "Image directory does not exist, creating it");
            fs::create_dir_all(&self.dir).await?;
        }

        let check = self.dir.join(WRITE_CHECK_FILENAME);
        fs::write(&check, b"").await?;
        fs::remove_file(&check).await?;
        Ok(())
    }

    /// Absolute location of `filename`, or `None` if the name could escape
    /// the image directory.
    pub fn path_for(&self, filename: &str) -> Option<PathBuf> {
        is_safe_image_filename(filename).then(|| self.dir.join(filename))
    }

    /// Durably write `bytes` under a freshly generated filename.
    ///
    /// A partially written file is removed before the error is returned.
    pub async fn write(&self, bytes: &[u8]) -> io::Result<PendingImage> {
        let filename = generate_image_filename();
        let path = self.dir.join(&filename);

        if let Err(e) = write_synced(&path, bytes).await {
            remove_quietly(&path).await;
            return Err(e);
        }

        tracing::debug!(filename = %filename, size = bytes.len(), "Image written");
        Ok(PendingImage { filename, path })
    }

    /// Best-effort removal of a stored image. Empty names are ignored.
    pub async fn remove(&self, filename: &str) {
        if filename.is_empty() {
            return;
        }
        match self.path_for(filename) {
            Some(path) => remove_quietly(&path).await,
            None => tracing::warn!(filename, "Refusing to remove image with unsafe filename"),
        }
    }
}

/// An image file that exists on disk but is not yet referenced by a record.
#[derive(Debug)]
#[must_use = "a pending image must be committed or discarded"]
pub struct PendingImage {
    filename: String,
    path: PathBuf,
}

impl PendingImage {
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Keep the file; a record now references it.
    pub fn commit(self) -> String {
        self.filename
    }

    /// Remove the file because the record mutation did not happen.
    pub async fn discard(self) {
        remove_quietly(&self.path).await;
    }
}

/// Commit or discard `pending` depending on the outcome of the store mutation.
pub async fn settle<T, E>(pending: Option<PendingImage>, result: Result<T, E>) -> Result<T, E> {
    if let Some(pending) = pending {
        match &result {
            Ok(_) => {
                pending.commit();
            }
            Err(_) => {
                tracing::debug!(filename = %pending.filename, "Discarding image after failed write");
                pending.discard().await;
            }
        }
    }
    result
}

async fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    Ok(())
}

async fn remove_quietly(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "Image removed"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "Image already absent");
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to delete image file");
        }
    }
}
