#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::Value;
use uuid::Uuid;

use todo_api::auth::{issue_token, JwtKeys};
use todo_api::config::{AppConfig, Environment, StoreBackend};
use todo_api::database::InMemoryTodoStore;
use todo_api::{app, AppState};

pub const TEST_SECRET: &str = "integration-test-secret";

/// Authenticated identity used to drive requests
#[derive(Debug, Clone)]
pub struct Caller {
    pub id: Uuid,
    pub token: String,
}

/// In-process server over an in-memory store, one per test
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub store: InMemoryTodoStore,
    keys: JwtKeys,
    client: reqwest::Client,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(|_| {}).await
    }

    pub async fn spawn_with(configure: impl FnOnce(&mut AppConfig)) -> Result<Self> {
        let mut config = AppConfig::defaults(Environment::Development);
        config.database.backend = StoreBackend::Memory;
        config.security.jwt_secret = TEST_SECRET.to_string();
        configure(&mut config);

        let store = InMemoryTodoStore::new();
        let keys = JwtKeys::from_secret(&config.security.jwt_secret)?;
        let router = app(AppState::new(Arc::new(store.clone()), keys.clone()), &config);

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self {
            port,
            base_url: format!("http://127.0.0.1:{}", port),
            store,
            keys,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// New user with a valid token
    pub fn caller(&self) -> Caller {
        let id = Uuid::new_v4();
        let token = issue_token(&self.keys, id, 1).expect("token");
        Caller { id, token }
    }

    pub fn get(&self, caller: &Caller, path: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(&caller.token)
    }

    pub fn post(&self, caller: &Caller, path: &str) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(&caller.token)
    }

    pub fn put(&self, caller: &Caller, path: &str) -> RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(&caller.token)
    }

    pub fn delete(&self, caller: &Caller, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(&caller.token)
    }

    /// POST a todo and return the created JSON, asserting 201
    pub async fn create_todo(&self, caller: &Caller, body: Value) -> Result<Value> {
        let res = self.post(caller, "/api/todos").json(&body).send().await?;
        expect_json(res, StatusCode::CREATED).await
    }

    /// GET /api/todos[?query] and return the array
    pub async fn list_todos(&self, caller: &Caller, query: &str) -> Result<Vec<Value>> {
        let res = self.get(caller, &format!("/api/todos{}", query)).send().await?;
        let body = expect_json(res, StatusCode::OK).await?;
        body.as_array()
            .cloned()
            .with_context(|| format!("expected array, got {}", body))
    }
}

/// Assert the status and decode the JSON body
pub async fn expect_json(res: Response, status: StatusCode) -> Result<Value> {
    let actual = res.status();
    let body = res.json::<Value>().await.context("response was not JSON")?;
    anyhow::ensure!(actual == status, "expected {}, got {}: {}", status, actual, body);
    Ok(body)
}

pub fn id_of(todo: &Value) -> String {
    todo["id"].as_str().expect("todo id").to_string()
}

pub fn ids(todos: &[Value]) -> Vec<String> {
    todos.iter().map(id_of).collect()
}
