#![allow(dead_code)]

use std::sync::Once;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};

use todo_api::{config::AppConfig, database::DatabaseManager, state::AppState};

static TRACING: Once = Once::new();

/// A running server with its own in-memory store.
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    pub config: AppConfig,
}

pub struct TestUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub token: String,
}

/// Boot the real router on an ephemeral port inside this process.
pub async fn spawn_server() -> Result<TestServer> {
    spawn_server_with(AppConfig::for_tests()).await
}

pub async fn spawn_server_with(config: AppConfig) -> Result<TestServer> {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });

    let db = DatabaseManager::in_memory();
    let state = AppState::new(config.clone(), &db).context("failed to build app state")?;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind ephemeral port")?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, todo_api::app(state)).await {
            tracing::error!("test server stopped: {}", e);
        }
    });

    Ok(TestServer {
        base_url: format!("http://{}", addr),
        client: Client::new(),
        config,
    })
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    pub fn post(&self, path: &str, token: &str, body: Value) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token).json(&body)
    }

    pub fn put(&self, path: &str, token: &str, body: Value) -> RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(token).json(&body)
    }

    pub fn delete(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(token)
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/api/auth/register"))
            .json(&json!({
                "username": username,
                "email": email,
                "password": password,
                "confirmPassword": password,
            }))
            .send()
            .await?)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?)
    }

    /// Register `username` as `<username>@example.com` / `secret1` and log in.
    pub async fn create_user(&self, username: &str) -> Result<TestUser> {
        let email = format!("{}@example.com", username);

        let res = self.register(username, &email, "secret1").await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register returned {}", res.status());

        let res = self.login(&email, "secret1").await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login returned {}", res.status());
        let body: Value = res.json().await?;

        Ok(TestUser {
            id: body["data"]["user"]["id"].as_str().context("missing user id")?.to_string(),
            username: username.to_string(),
            email,
            token: body["data"]["token"].as_str().context("missing token")?.to_string(),
        })
    }

    /// Create a todo and return its `data` payload.
    pub async fn create_todo(&self, token: &str, body: Value) -> Result<Value> {
        let res = self.post("/api/todos", token, body).send().await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create returned {}", res.status());
        let body: Value = res.json().await?;
        Ok(body["data"].clone())
    }
}
