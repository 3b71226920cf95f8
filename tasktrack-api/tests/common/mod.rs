/// Common test utilities for integration tests
///
/// Builds the full router on top of an in-memory store, so the suite needs no
/// database. Requests go through `tower::Service::call` exactly as the server
/// would dispatch them.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tasktrack_api::app::{build_router, AppState};
use tasktrack_api::config::Config;
use tasktrack_shared::store::memory::MemoryStore;
use tower::Service as _;

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Test context containing the router and its configuration
pub struct TestContext {
    pub app: axum::Router,
    pub config: Config,
}

impl TestContext {
    /// Router with a signing secret configured
    pub fn new() -> Self {
        Self::with_secret(Some(TEST_SECRET))
    }

    pub fn with_secret(secret: Option<&str>) -> Self {
        let secret = secret.map(str::to_string);
        let config = Config::from_lookup(|key| match key {
            "JWT_SECRET" => secret.clone(),
            _ => None,
        })
        .expect("default configuration should load");

        let state = AppState::new(Arc::new(MemoryStore::new()), config.clone());

        Self {
            app: build_router(state),
            config,
        }
    }

    /// Sends a request and returns the status and the parsed JSON body
    /// (`Value::Null` for an empty body)
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, json)
    }

    /// Registers a user and logs in; returns the user id and token
    pub async fn register_and_login(&self, username: &str) -> (i64, String) {
        let email = format!("{}@example.com", username);
        let password = format!("{}-password", username);

        let (status, user) = self
            .send(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({ "username": username, "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", user);

        let (status, login) = self
            .send(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", login);

        let token = login["token"].as_str().unwrap().to_string();
        (user["id"].as_i64().unwrap(), token)
    }

    /// Creates a task through the API and returns its JSON
    pub async fn create_task(&self, token: &str, body: Value) -> Value {
        let (status, task) = self.send("POST", "/api/tasks", Some(token), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", task);
        task
    }
}
