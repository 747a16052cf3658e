//! # Common Test Utilities
//!
//! This module centralizes test harnesses and helper functions used across the
//! `petcare-server` integration tests. It includes:
//!
//! - `TestApp`: A full application harness that spawns a real server on a random port,
//!   configured with a local AI provider pointed at an `httpmock::MockServer`.
//! - `TestApp::spawn_with_mock`: the same server, with the providers replaced by
//!   the in-process `MockAiProvider` from `petcare-test-utils`.

// Allow unused code because this is a test utility module, and not all
// functions might be used by every test file that includes it.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use httpmock::MockServer;
use petcare::providers::db::sqlite::SqliteProvider;
use petcare_server::{
    config, router,
    state::{assemble_state, AppState},
};
use petcare_test_utils::MockAiProvider;
use reqwest::Client;
use std::{fs::File, io::Write, net::SocketAddr, path::PathBuf};
use tempfile::{tempdir, NamedTempFile, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};

/// A tiny valid PNG header, enough for the upload path.
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// A harness for end-to-end testing of the Axum server.
///
/// This struct spawns the server on a random available port, sets up a temporary
/// SQLite database and uploads directory, and configures the `AppState` to use a
/// local AI provider pointed at an `httpmock::MockServer` instance.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub uploads_dir: PathBuf,
    pub app_state: AppState,
    _db_file: NamedTempFile,
    _work_dir: TempDir,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

/// The default upload limit, as in `AppConfig`.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

fn write_config(
    work_dir: &TempDir,
    db_path: &str,
    uploads_dir: &str,
    api_url: &str,
    max_upload_bytes: usize,
) -> Result<PathBuf> {
    let config_path = work_dir.path().join("config.yml");
    let config_content = format!(
        r#"
port: 0
db_url: "{db_path}"
uploads_dir: "{uploads_dir}"
max_upload_bytes: {max_upload_bytes}
retry:
  max_attempts: 1
  backoff_ms: 1
providers:
  local_default:
    provider: "local"
    api_url: "{api_url}"
    api_key: null
    model_name: "mock-chat-model"
tasks:
  analysis:
    provider: "local_default"
  image_labeling:
    provider: "local_default"
"#
    );
    let mut file = File::create(&config_path)?;
    file.write_all(config_content.as_bytes())?;
    Ok(config_path)
}

impl TestApp {
    /// Spawns the application server backed by the HTTP mock server.
    pub async fn spawn() -> Result<Self> {
        let mock_server = MockServer::start_async().await;
        let db_file = NamedTempFile::new()?;
        let work_dir = tempdir()?;
        let uploads_dir = work_dir.path().join("uploads");

        let config_path = write_config(
            &work_dir,
            db_file.path().to_str().unwrap(),
            uploads_dir.to_str().unwrap(),
            &mock_server.url("/v1/chat/completions"),
            DEFAULT_MAX_UPLOAD_BYTES,
        )?;
        let config = config::get_config(Some(config_path.to_str().unwrap()))?;
        let app_state = petcare_server::state::build_app_state(config).await?;

        Self::spawn_with_state(app_state, mock_server, db_file, work_dir, uploads_dir).await
    }

    /// Spawns the application server with `mock` as both the generator and
    /// the labeler.
    pub async fn spawn_with_mock(mock: MockAiProvider) -> Result<Self> {
        Self::spawn_with_mock_and_limit(mock, DEFAULT_MAX_UPLOAD_BYTES).await
    }

    /// Same as [`TestApp::spawn_with_mock`] with a custom upload size limit.
    pub async fn spawn_with_mock_and_limit(
        mock: MockAiProvider,
        max_upload_bytes: usize,
    ) -> Result<Self> {
        let mock_server = MockServer::start_async().await;
        let db_file = NamedTempFile::new()?;
        let work_dir = tempdir()?;
        let uploads_dir = work_dir.path().join("uploads");

        let config_path = write_config(
            &work_dir,
            db_file.path().to_str().unwrap(),
            uploads_dir.to_str().unwrap(),
            &mock_server.url("/unused"),
            max_upload_bytes,
        )?;
        let config = config::get_config(Some(config_path.to_str().unwrap()))?;
        let sqlite = SqliteProvider::new(&config.db_url).await?;
        let app_state =
            assemble_state(config, sqlite, Box::new(mock.clone()), Box::new(mock)).await?;

        Self::spawn_with_state(app_state, mock_server, db_file, work_dir, uploads_dir).await
    }

    async fn spawn_with_state(
        app_state: AppState,
        mock_server: MockServer,
        db_file: NamedTempFile,
        work_dir: TempDir,
        uploads_dir: PathBuf,
    ) -> Result<Self> {
        dotenvy::dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let app_state_for_harness = app_state.clone();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            uploads_dir,
            app_state: app_state_for_harness,
            _db_file: db_file,
            _work_dir: work_dir,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Lists the files written to the uploads directory.
    pub fn stored_uploads(&self) -> Vec<String> {
        std::fs::read_dir(&self.uploads_dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
