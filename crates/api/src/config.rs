use std::path::PathBuf;
use std::time::Duration;

use archive_db::StoreBackend;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables or a `.env` file.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Which store to build, from `STORE_BACKEND` and `SQLITE_PATH`.
    pub store: StoreBackend,
    /// Directory holding uploaded entry images (default: `./images`).
    pub image_dir: PathBuf,
    /// Largest accepted request body in bytes (default: 16 MiB).
    pub max_upload_bytes: usize,
    /// Interval between forced store flushes in seconds (default: `3600`).
    pub flush_interval_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `8080`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `STORE_BACKEND`        | `sqlite`                   |
    /// | `SQLITE_PATH`          | `archive.sqlite`           |
    /// | `IMAGE_PATH`           | `./images`                 |
    /// | `MAX_UPLOAD_BYTES`     | `16777216`                 |
    /// | `FLUSH_INTERVAL_SECS`  | `3600`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let sqlite_path = std::env::var("SQLITE_PATH").unwrap_or_else(|_| "archive.sqlite".into());
        let store = parse_store_backend(
            &std::env::var("STORE_BACKEND").unwrap_or_else(|_| "sqlite".into()),
            PathBuf::from(sqlite_path),
        )
        .unwrap_or_else(|e| panic!("{e}"));

        let image_dir = PathBuf::from(
            std::env::var("IMAGE_PATH").unwrap_or_else(|_| "./images".into()),
        );

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| (16 * 1024 * 1024).to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let flush_interval_secs: u64 = std::env::var("FLUSH_INTERVAL_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("FLUSH_INTERVAL_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            store,
            image_dir,
            max_upload_bytes,
            flush_interval_secs,
        }
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs)
    }
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Map a `STORE_BACKEND` value onto a [`StoreBackend`].
fn parse_store_backend(name: &str, sqlite_path: PathBuf) -> Result<StoreBackend, String> {
    match name.trim().to_lowercase().as_str() {
        "memory" => Ok(StoreBackend::Memory),
        "sqlite" => Ok(StoreBackend::Sqlite { path: sqlite_path }),
        other => Err(format!(
            "Unknown STORE_BACKEND '{other}'. Must be one of: sqlite, memory"
        )),
    }
}
