#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use archive_api::config::ServerConfig;
use archive_api::images::ImageStore;
use archive_api::router::build_app_router;
use archive_api::state::AppState;
use archive_db::{ArchiveStore, MemoryStore, SqliteStore, StoreBackend};

/// Boundary used by every multipart body built in tests.
pub const BOUNDARY: &str = "archive-test-boundary";

/// The full application over a fresh store and a temporary image directory.
/// The directories live as long as this value.
pub struct TestApp {
    pub router: Router,
    pub images: TempDir,
    /// Holds the SQLite database file, when the store has one.
    pub database: Option<TempDir>,
}

impl TestApp {
    /// A router handle for one request.
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Names of the files currently in the image directory, sorted.
    pub fn image_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.images.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(image_dir: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        store: StoreBackend::Memory,
        image_dir: image_dir.to_path_buf(),
        max_upload_bytes: 1024 * 1024,
        flush_interval_secs: 3600,
    }
}

/// Build the full application router with all middleware layers over an
/// in-memory store.
///
/// Uses the same [`build_app_router`] as `main.rs`, so tests exercise the
/// production middleware stack.
pub fn build_test_app() -> TestApp {
    build_test_app_with(Arc::new(MemoryStore::new()))
}

/// Build the full application over a SQLite database in a temporary directory.
pub async fn build_sqlite_test_app() -> TestApp {
    let database = tempfile::tempdir().expect("create database dir");
    let store = SqliteStore::open(database.path().join("archive.sqlite"))
        .await
        .expect("open sqlite store");

    let mut test = build_test_app_with(Arc::new(store));
    test.database = Some(database);
    test
}

pub fn build_test_app_with(store: Arc<dyn ArchiveStore>) -> TestApp {
    let images = tempfile::tempdir().expect("create image dir");
    let config = test_config(images.path());

    let state = AppState {
        store,
        images: Arc::new(ImageStore::new(images.path())),
    };

    TestApp {
        router: build_app_router(state, &config),
        images,
        database: None,
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn json_request(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    json_request(app, Method::POST, uri, body).await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    json_request(app, Method::PATCH, uri, body).await
}

async fn multipart_request(
    app: Router,
    method: Method,
    uri: &str,
    form: MultipartForm,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(form.finish()))
        .unwrap();
    send(app, request).await
}

pub async fn post_multipart(app: Router, uri: &str, form: MultipartForm) -> Response<Body> {
    multipart_request(app, Method::POST, uri, form).await
}

pub async fn patch_multipart(app: Router, uri: &str, form: MultipartForm) -> Response<Body> {
    multipart_request(app, Method::PATCH, uri, form).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

// ---------------------------------------------------------------------------
// Multipart bodies
// ---------------------------------------------------------------------------

/// Hand-built `multipart/form-data` body using [`BOUNDARY`].
#[derive(Default)]
pub struct MultipartForm {
    buf: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        self.buf.extend_from_slice(bytes);
        self.buf.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.buf
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.buf
    }
}

/// An entry form with every required field; optional text fields empty.
pub fn entry_form(title: &str, description: &str, collection_id: i64) -> MultipartForm {
    MultipartForm::new()
        .text("title", title)
        .text("description", description)
        .text("donor", "")
        .text("yearCreated", "")
        .text("colour", "")
        .text("size", "")
        .text("collectionId", &collection_id.to_string())
        .text("physicalLocation", "")
        .text("mediaType", "")
}

/// Create a collection and return its id.
pub async fn create_collection(test: &TestApp, name: &str) -> i64 {
    let response = post_json(
        test.app(),
        "/api/v1/collection",
        serde_json::json!({ "name": name }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Create an entry from `form` and return the response `data` object.
pub async fn create_entry(test: &TestApp, form: MultipartForm) -> serde_json::Value {
    let response = post_multipart(test.app(), "/api/v1/entry", form).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}
