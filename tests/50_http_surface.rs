mod common;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use idm_api::app::{app, AppState};
use idm_api::auth::IDM_ADMIN;
use idm_api::config::AppConfig;
use idm_api::database::models::Employee;
use idm_api::database::{DatabaseError, EmployeeRepository, EmployeeTransaction, HealthCheck, MemoryStore};

struct UnreachableStore;

#[async_trait]
impl HealthCheck for UnreachableStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Err(DatabaseError::QueryError("connection refused".into()))
    }
}

/// Memory store whose full listing takes longer than any request may.
struct SlowListing(MemoryStore);

#[async_trait]
impl EmployeeRepository for SlowListing {
    async fn begin(&self) -> Result<Box<dyn EmployeeTransaction>, DatabaseError> {
        self.0.begin().await
    }

    async fn begin_read_only(&self) -> Result<Box<dyn EmployeeTransaction>, DatabaseError> {
        self.0.begin_read_only().await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Employee>, DatabaseError> {
        EmployeeRepository::find_by_id(&self.0, id).await
    }

    async fn find_all(&self) -> Result<Vec<Employee>, DatabaseError> {
        tokio::time::sleep(Duration::from_secs(3)).await;
        EmployeeRepository::find_all(&self.0).await
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Employee>, DatabaseError> {
        EmployeeRepository::find_by_ids(&self.0, ids).await
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), DatabaseError> {
        EmployeeRepository::delete_by_id(&self.0, id).await
    }

    async fn delete_by_ids(&self, ids: &[i64]) -> Result<(), DatabaseError> {
        EmployeeRepository::delete_by_ids(&self.0, ids).await
    }
}

async fn json_body(app: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&bytes)?))
}

#[tokio::test]
async fn unhealthy_store_answers_with_error_envelope() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let app = app(AppState::new(
        common::test_config(),
        store.clone(),
        store,
        Arc::new(UnreachableStore),
    ));

    let (status, body) = common::send(&app, Method::GET, "/api/internal/health", None, None).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "DOWN");
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
    Ok(())
}

#[tokio::test]
async fn oversized_body_answers_with_error_envelope() -> Result<()> {
    let mut config: AppConfig = common::test_config();
    config.api.max_request_size_bytes = 64;
    let app = common::app_over(MemoryStore::new(), config);

    let payload = serde_json::to_vec(&serde_json::json!({ "name": "x".repeat(200) }))?;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/employees")
        .header(header::AUTHORIZATION, format!("Bearer {}", common::token(&[IDM_ADMIN])))
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, payload.len())
        .body(Body::from(payload))?;

    let (status, body) = json_body(&app, request).await?;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    Ok(())
}

#[tokio::test]
async fn slow_request_answers_with_error_envelope() -> Result<()> {
    let mut config = common::test_config();
    config.api.request_timeout_secs = 1;
    config.api.get_all_timeout_ms = 10_000;
    let memory = MemoryStore::new();
    let app = app(AppState::new(
        config,
        Arc::new(SlowListing(memory.clone())),
        Arc::new(memory.clone()),
        Arc::new(memory),
    ));

    let token = common::token(&[IDM_ADMIN]);
    let (status, body) = common::send(&app, Method::GET, "/api/v1/employees", Some(&token), None).await?;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "REQUEST_TIMEOUT");
    Ok(())
}

#[tokio::test]
async fn api_document_is_public() -> Result<()> {
    let (app, _) = common::memory_app();

    let (status, doc) = common::send(&app, Method::GET, "/swagger/doc.json", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["openapi"].as_str().unwrap_or_default().starts_with("3."));
    assert!(doc["paths"]["/api/v1/employees/page-key-set"]["get"].is_object());

    let (status, page) = common::send_raw(&app, Method::GET, "/swagger/index.html", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8_lossy(&page).contains("/swagger/doc.json"));
    Ok(())
}
