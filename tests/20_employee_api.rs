mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use idm_api::auth::{IDM_ADMIN, IDM_USER};

#[tokio::test]
async fn create_then_duplicate() -> Result<()> {
    let (app, _) = common::memory_app();
    let admin = common::token(&[IDM_ADMIN]);

    let (status, body) = common::send(
        &app,
        Method::POST,
        "/api/v1/employees",
        Some(&admin),
        Some(json!({ "name": "John" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let id = body["data"].as_i64().unwrap();
    assert!(id > 0);

    let (status, body) = common::send(
        &app,
        Method::POST,
        "/api/v1/employees",
        Some(&admin),
        Some(json!({ "name": "John" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "ALREADY_EXISTS");
    assert!(body["error"].as_str().unwrap().contains("John"));

    let (_, body) = common::send(&app, Method::GET, "/api/v1/employees", Some(&admin), None).await?;
    let all = body["data"].as_array().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0]["name"], "John");
    Ok(())
}

#[tokio::test]
async fn create_validates_name() -> Result<()> {
    let (app, _) = common::memory_app();
    let admin = common::token(&[IDM_ADMIN]);

    for bad in [json!({ "name": "J" }), json!({ "name": "x".repeat(156) })] {
        let (status, body) =
            common::send(&app, Method::POST, "/api/v1/employees", Some(&admin), Some(bad)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["error"].as_str().unwrap().starts_with("name:"));
    }

    let (status, body) =
        common::send(&app, Method::POST, "/api/v1/employees", Some(&admin), Some(json!({}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn find_by_id_found_missing_and_malformed() -> Result<()> {
    let (app, _) = common::memory_app();
    let admin = common::token(&[IDM_ADMIN]);
    let reader = common::token(&[IDM_USER]);
    let ids = common::seed_employees(&app, &admin, &["Ada"]).await?;

    let (status, body) =
        common::send(&app, Method::GET, &format!("/api/v1/employees/{}", ids[0]), Some(&reader), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Ada");
    assert!(body["data"]["created_at"].is_string());

    // absent rows are not a server fault
    let (status, body) = common::send(&app, Method::GET, "/api/v1/employees/999", Some(&reader), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = common::send(&app, Method::GET, "/api/v1/employees/0", Some(&reader), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = common::send(&app, Method::GET, "/api/v1/employees/abc", Some(&reader), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn search_and_batch_delete() -> Result<()> {
    let (app, _) = common::memory_app();
    let admin = common::token(&[IDM_ADMIN]);
    let ids = common::seed_employees(&app, &admin, &["Ada", "Bob", "Cy"]).await?;

    let (status, body) = common::send(
        &app,
        Method::POST,
        "/api/v1/employees/search",
        Some(&admin),
        Some(json!({ "ids": [ids[0], ids[2]] })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, _) = common::send(
        &app,
        Method::POST,
        "/api/v1/employees/search",
        Some(&admin),
        Some(json!({ "ids": [] })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = common::send(
        &app,
        Method::DELETE,
        "/api/v1/employees/batch-delete",
        Some(&admin),
        Some(json!({ "ids": [ids[0], ids[1]] })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = common::send(&app, Method::GET, "/api/v1/employees", Some(&admin), None).await?;
    let rest = body["data"].as_array().unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0]["name"], "Cy");
    Ok(())
}

#[tokio::test]
async fn delete_is_idempotent() -> Result<()> {
    let (app, _) = common::memory_app();
    let admin = common::token(&[IDM_ADMIN]);
    let ids = common::seed_employees(&app, &admin, &["Ada"]).await?;
    let uri = format!("/api/v1/employees/{}", ids[0]);

    let (first, _) = common::send(&app, Method::DELETE, &uri, Some(&admin), None).await?;
    let (second, body) = common::send(&app, Method::DELETE, &uri, Some(&admin), None).await?;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(body["success"], true);
    Ok(())
}
