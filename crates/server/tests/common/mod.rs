//! # Common Test Utilities
//!
//! Centralizes the harness and helper functions used across the
//! `nexusone-server` integration tests:
//!
//! - `TestApp`: a full application harness that spawns the real server on a
//!   random port, backed by a temporary SQLite database, with the extraction
//!   service and the chat provider pointed at an `httpmock::MockServer`.
//! - JWT helpers for minting employee tokens.
//! - Seeding helpers for companies and policy files.

// Allow unused code because this is a shared test module, and not every test
// file uses every helper.
#![allow(unused)]

use anyhow::Result;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use httpmock::MockServer;
use jsonwebtoken::{encode, EncodingKey, Header};
use nexusone_server::{
    auth::middleware::Claims,
    config, router,
    state::{build_app_state, AppState},
};
use reqwest::Client;
use serde_json::Value;
use std::{
    fs::File,
    io::Write,
    net::SocketAddr,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};
use tempfile::{tempdir, NamedTempFile, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};

/// A harness for end-to-end testing of the Axum server.
///
/// Spawns the server on a random available port, sets up a temporary SQLite
/// database, and configures the `AppState` to use a mock chat provider and a
/// mock extraction service, both served by `httpmock`.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub db_path: PathBuf,
    pub app_state: AppState,
    _db_file: NamedTempFile,
    _config_dir: TempDir,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the application server and returns a `TestApp` instance.
    pub async fn spawn() -> Result<Self> {
        dotenvy::dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let mock_server = MockServer::start();
        let db_file = NamedTempFile::new()?;
        let db_path = db_file.path().to_path_buf();

        let config_dir = tempdir()?;
        let config_path = config_dir.path().join("config.yml");
        let config_content = format!(
            r#"
port: 0
db_url: "{}"
extraction:
  api_url: "{}"
  timeout_secs: 5
upload:
  max_size_bytes: 65536
providers:
  default:
    provider: "local"
    api_url: "{}"
    api_key: null
    model_name: "mock-chat-model"
"#,
            db_path.to_str().unwrap(),
            mock_server.url("/extract"),
            mock_server.url("/v1/chat/completions")
        );
        let mut file = File::create(&config_path)?;
        file.write_all(config_content.as_bytes())?;

        let config = config::get_config(Some(config_path.to_str().unwrap()))?;
        let app_state = build_app_state(config).await?;
        let app_state_for_harness = app_state.clone();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
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
            db_path,
            app_state: app_state_for_harness,
            _db_file: db_file,
            _config_dir: config_dir,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Registers a company through the API and returns its id.
    pub async fn create_company(&self, name: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/companies", self.address))
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await?;
        anyhow::ensure!(
            response.status().is_success(),
            "company creation failed: {}",
            response.status()
        );
        let body: Value = response.json().await?;
        Ok(body["result"]["id"]
            .as_str()
            .expect("company id missing")
            .to_string())
    }

    /// Uploads a policy file through the API and returns its id.
    pub async fn upload_policy(
        &self,
        token: &str,
        filename: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/policies", self.address))
            .bearer_auth(token)
            .json(&serde_json::json!({
                "filename": filename,
                "contentType": content_type,
                "fileData": BASE64.encode(bytes),
            }))
            .send()
            .await?;
        anyhow::ensure!(
            response.status().is_success(),
            "policy upload failed: {}",
            response.status()
        );
        let body: Value = response.json().await?;
        Ok(body["result"]["id"]
            .as_str()
            .expect("file id missing")
            .to_string())
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Generates a valid JWT for an employee of the given company.
pub fn generate_jwt(sub: &str, company_id: &str, name: &str) -> Result<String> {
    generate_jwt_with_expiry(sub, company_id, name, 3600)
}

/// Generates a JWT with a custom expiration offset in seconds.
pub fn generate_jwt_with_expiry(
    sub: &str,
    company_id: &str,
    name: &str,
    expires_in_secs: u64,
) -> Result<String> {
    let expiration = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() + expires_in_secs;
    let claims = Claims {
        sub: sub.to_string(),
        exp: expiration as usize,
        company_id: company_id.to_string(),
        name: name.to_string(),
    };
    let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| "a-secure-secret-key".to_string());
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;
    Ok(token)
}

/// Builds an OpenAI-compatible chat completion body with the given content.
pub fn chat_completion_body(content: &str) -> Value {
    serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
}
