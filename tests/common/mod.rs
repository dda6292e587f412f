#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use idm_api::app::{app, AppState};
use idm_api::auth::{issue_token, Claims};
use idm_api::config::{AppConfig, StoreDriver};
use idm_api::database::MemoryStore;

pub const SECRET: &str = "integration-secret";

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.app_name = "idm".to_string();
    config.app_version = "0.1.0-test".to_string();
    config.database.driver = StoreDriver::Memory;
    config.security.jwt_secret = SECRET.to_string();
    config
}

pub fn memory_app() -> (Router, MemoryStore) {
    let store = MemoryStore::new();
    (app_over(store.clone(), test_config()), store)
}

pub fn app_over(store: MemoryStore, config: AppConfig) -> Router {
    let shared = Arc::new(store);
    app(AppState::new(config, shared.clone(), shared.clone(), shared))
}

pub fn token(roles: &[&str]) -> String {
    let claims = Claims::new("tester", roles.iter().map(|r| r.to_string()).collect(), 1);
    issue_token(&claims, SECRET).expect("token")
}

/// Drive one request through the router and decode the JSON body.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let (status, bytes) = send_raw(app, method, uri, bearer, body).await?;
    let json = serde_json::from_slice(&bytes)
        .with_context(|| format!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))?;
    Ok((status, json))
}

pub async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Vec<u8>)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, bytes.to_vec()))
}

/// Create employees through the API, returning their ids in order.
pub async fn seed_employees(app: &Router, admin: &str, names: &[&str]) -> Result<Vec<i64>> {
    let mut ids = Vec::new();
    for name in names {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/v1/employees",
            Some(admin),
            Some(serde_json::json!({ "name": name })),
        )
        .await?;
        anyhow::ensure!(status == StatusCode::OK, "seed {} failed: {}", name, body);
        ids.push(body["data"].as_i64().context("id missing")?);
    }
    Ok(ids)
}

/// A real listener on a free port, for tests that need a socket.
pub struct TestServer {
    pub base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn(router: Router) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        let server = Self {
            base_url: format!("http://127.0.0.1:{}", port),
            handle,
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            let url = format!("{}/api/internal/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status().is_success() {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
