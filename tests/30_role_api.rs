mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use idm_api::auth::{IDM_ADMIN, IDM_USER};

async fn create_role(app: &axum::Router, admin: &str, name: &str) -> Result<i64> {
    let (status, body) = common::send(
        app,
        Method::POST,
        "/api/v1/roles",
        Some(admin),
        Some(json!({ "name": name })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    Ok(body["data"].as_i64().unwrap())
}

#[tokio::test]
async fn role_crud_cycle() -> Result<()> {
    let (app, _) = common::memory_app();
    let admin = common::token(&[IDM_ADMIN]);
    let reader = common::token(&[IDM_USER]);

    let auditor = create_role(&app, &admin, "auditor").await?;
    let operator = create_role(&app, &admin, "operator").await?;

    let (status, body) =
        common::send(&app, Method::GET, &format!("/api/v1/roles/{}", auditor), Some(&reader), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "auditor");

    let (_, body) = common::send(
        &app,
        Method::POST,
        "/api/v1/roles/search",
        Some(&reader),
        Some(json!({ "ids": [auditor, operator, 404] })),
    )
    .await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, _) = common::send(
        &app,
        Method::DELETE,
        "/api/v1/roles/batch-delete",
        Some(&admin),
        Some(json!({ "ids": [auditor, operator] })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = common::send(&app, Method::GET, "/api/v1/roles", Some(&reader), None).await?;
    assert!(body["data"].as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn role_names_may_repeat() -> Result<()> {
    let (app, _) = common::memory_app();
    let admin = common::token(&[IDM_ADMIN]);

    let first = create_role(&app, &admin, "admin").await?;
    let second = create_role(&app, &admin, "admin").await?;
    assert_ne!(first, second);
    Ok(())
}

#[tokio::test]
async fn missing_role_is_soft_not_found() -> Result<()> {
    let (app, _) = common::memory_app();
    let reader = common::token(&[IDM_USER]);

    let (status, body) = common::send(&app, Method::GET, "/api/v1/roles/77", Some(&reader), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn roles_have_no_page_routes() -> Result<()> {
    let (app, _) = common::memory_app();
    let reader = common::token(&[IDM_USER]);

    let (status, _) =
        common::send_raw(&app, Method::GET, "/api/v1/roles/page?pageSize=5", Some(&reader), None).await?;
    // "page" is taken as an id and fails to parse
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}
