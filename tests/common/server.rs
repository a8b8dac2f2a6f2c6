//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own album store.

use super::constants::*;
use super::fixtures::create_test_album_db;
use album_catalog_server::album_store::{AlbumStore, InMemoryAlbumStore, SqliteAlbumStore};
use album_catalog_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated album store
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Store handle for direct access in tests
    pub store: Arc<dyn AlbumStore>,

    db_path: Option<PathBuf>,

    // Private fields - keep resources alive until drop
    _temp_db_dir: Option<TempDir>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server backed by a temporary SQLite database with the seeded albums
    ///
    /// # Panics
    ///
    /// Panics if the database cannot be created or the server fails to start.
    pub async fn spawn() -> Self {
        let (temp_db_dir, db_path) =
            create_test_album_db().expect("Failed to create test database");
        let store: Arc<dyn AlbumStore> =
            Arc::new(SqliteAlbumStore::new(&db_path).expect("Failed to open album store"));

        Self::spawn_with_store(store, Some(db_path), Some(temp_db_dir)).await
    }

    /// Spawns a server backed by the seeded in-memory store
    pub async fn spawn_in_memory() -> Self {
        Self::spawn_with_store(Arc::new(InMemoryAlbumStore::seeded()), None, None).await
    }

    async fn spawn_with_store(
        store: Arc<dyn AlbumStore>,
        db_path: Option<PathBuf>,
        temp_db_dir: Option<TempDir>,
    ) -> Self {
        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
        };
        let app = make_app(config, store.clone());

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            store,
            db_path,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Path of the SQLite database, when the server has one
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Waits for the server to become ready by polling the /health endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/health", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => {
                    return;
                }
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signal
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
        // TempDir will be cleaned up automatically
    }
}
