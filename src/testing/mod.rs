use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::state::AppState;

/// In-process application over the memory store, driven with `oneshot`
pub struct TestContext {
    pub state: AppState,
    router: Router,
}

#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub token: String,
}

impl TestContext {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_config(AppConfig::for_tests())
    }

    pub fn with_config(config: AppConfig) -> anyhow::Result<Self> {
        let db = DatabaseManager::in_memory();
        let state = AppState::new(config, &db)?;
        let router = crate::app(state.clone());
        Ok(Self { state, router })
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, value))
    }

    /// Register and log in `username` with `<username>@example.com`.
    pub async fn create_user(&self, username: &str) -> anyhow::Result<TestUser> {
        let email = format!("{}@example.com", username);
        let (status, body) = self
            .request(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "email": email,
                    "password": "secret1",
                    "confirmPassword": "secret1",
                })),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "register failed: {}", body);

        let (status, body) = self
            .request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": "secret1" })),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed: {}", body);

        Ok(TestUser {
            id: body["data"]["user"]["id"].as_str().unwrap_or_default().to_string(),
            token: body["data"]["token"].as_str().unwrap_or_default().to_string(),
        })
    }
}
