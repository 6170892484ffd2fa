use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use archive_api::background::durability;
use archive_api::config::ServerConfig;
use archive_api::images::ImageStore;
use archive_api::router::build_app_router;
use archive_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "archive_api=debug,archive_db=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Store ---
    let store = archive_db::open_store(&config.store)
        .await
        .expect("Failed to open record store");

    store
        .health_check()
        .await
        .expect("Record store health check failed");
    tracing::info!(backend = ?config.store, "Record store ready");

    // --- Images ---
    let images = ImageStore::new(&config.image_dir);
    images
        .prepare()
        .await
        .expect("Image directory is not writable");
    tracing::info!(dir = %config.image_dir.display(), "Image directory ready");

    // --- Durability flush ---
    let flush_cancel = CancellationToken::new();
    let flush_handle = tokio::spawn(durability::run(
        Arc::clone(&store),
        config.flush_interval(),
        flush_cancel.clone(),
    ));

    // --- App state ---
    let state = AppState {
        store: Arc::clone(&store),
        images: Arc::new(images),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    flush_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), flush_handle).await;

    match store.flush().await {
        Ok(()) => tracing::info!("Final store flush complete"),
        Err(e) => tracing::error!(error = %e, "Final store flush failed"),
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
