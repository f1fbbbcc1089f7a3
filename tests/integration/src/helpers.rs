//! Test helpers for integration tests
//!
//! [`Engine`] runs the services against a real file-backed snapshot store in
//! a temporary directory. [`TestServer`] serves the full command surface
//! over HTTP on top of the same pieces.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use nick_api::{create_app, AppState};
use nick_common::AppConfig;
use nick_core::GuildId;
use nick_service::testing::{InMemoryPlatform, ScriptedDocuments};
use nick_service::ServiceContext;
use nick_store::FileSnapshotStore;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Credential the test server accepts
pub const TEST_TOKEN: &str = "test-bot-token";

/// Engine over an in-memory platform and an on-disk snapshot store
pub struct Engine {
    pub platform: Arc<InMemoryPlatform>,
    pub documents: Arc<ScriptedDocuments>,
    pub store: Arc<FileSnapshotStore>,
    pub ctx: ServiceContext,
    dir: TempDir,
}

impl Engine {
    pub fn new(platform: InMemoryPlatform) -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let template = dir.path().join("state_{}.temp.json");
        let platform = Arc::new(platform);
        let documents = Arc::new(ScriptedDocuments::default());
        let store = Arc::new(FileSnapshotStore::new(template.to_string_lossy()));
        let ctx = ServiceContext::new(platform.clone(), store.clone(), documents.clone());

        Ok(Self {
            platform,
            documents,
            store,
            ctx,
            dir,
        })
    }

    /// Directory holding the active snapshots and their archives
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Snapshot path template the store was built with
    pub fn template(&self) -> String {
        self.dir
            .path()
            .join("state_{}.temp.json")
            .to_string_lossy()
            .into_owned()
    }

    pub fn active_path(&self, guild: &str) -> PathBuf {
        self.store.active_path(&GuildId::parse(guild).unwrap())
    }

    /// Raw bytes of the active snapshot, if one exists
    pub fn active_bytes(&self, guild: &str) -> Option<Vec<u8>> {
        std::fs::read(self.active_path(guild)).ok()
    }

    /// File names in the snapshot directory ending in `.archive`
    pub fn archive_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".archive"))
            .collect();
        names.sort();
        names
    }
}

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub engine: Engine,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Serve the command surface over `platform`
    pub async fn start(platform: InMemoryPlatform) -> Result<Self> {
        let engine = Engine::new(platform)?;
        let config = test_config(&engine.template())?;

        let ctx = ServiceContext::new(
            engine.platform.clone(),
            engine.store.clone(),
            engine.documents.clone(),
        );
        let app = create_app(AppState::new(ctx, config));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            engine,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Make an unauthenticated GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    /// GET carrying the bot credential and the caller's id
    pub async fn command_get(&self, path: &str, actor: &str) -> Result<Response> {
        Ok(self.as_actor(self.client.get(self.url(path)), actor).send().await?)
    }

    /// POST carrying the bot credential and the caller's id
    pub async fn command_post(
        &self,
        path: &str,
        actor: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Response> {
        let request = self.as_actor(self.client.post(self.url(path)), actor);
        let request = match body {
            Some(body) => request.json(&body),
            None => request,
        };
        Ok(request.send().await?)
    }

    fn as_actor(&self, request: RequestBuilder, actor: &str) -> RequestBuilder {
        request
            .header("Authorization", format!("Bot {TEST_TOKEN}"))
            .header("X-Actor-Id", actor)
    }
}

/// Configuration for a test server storing snapshots under `template`
pub fn test_config(template: &str) -> Result<AppConfig> {
    let template = template.to_string();
    AppConfig::from_lookup(|key| match key {
        "AUTH" => Some(TEST_TOKEN.to_string()),
        "STATE_PATH_TEMPLATE" => Some(template.clone()),
        "AUDIT_ON_STARTUP" => Some("false".to_string()),
        _ => None,
    })
    .map_err(|e| anyhow::anyhow!("Config error: {e}"))
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert an error response and return its `error` object
pub async fn assert_error(
    response: Response,
    expected_status: StatusCode,
    expected_code: &str,
) -> Result<serde_json::Value> {
    let body: serde_json::Value = assert_json(response, expected_status).await?;
    let error = body["error"].clone();
    if error["code"] != expected_code {
        anyhow::bail!("Expected error code {expected_code}, got {error}");
    }
    Ok(error)
}
