// OpenAPI document for the HTTP surface, served under /swagger
use axum::{
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers::{employee, info, role};

#[derive(OpenApi)]
#[openapi(
    info(title = "IDM API", description = "Employee and role management"),
    paths(
        employee::create,
        employee::get_all,
        employee::get_page,
        employee::get_key_set_page,
        employee::find_by_id,
        employee::search,
        employee::delete,
        employee::delete_group,
        role::create,
        role::get_all,
        role::find_by_id,
        role::search,
        role::delete,
        role::delete_group,
        info::info,
        info::health,
    ),
    modifiers(&BearerJwt),
    tags(
        (name = "employees", description = "Employee resource"),
        (name = "roles", description = "Role resource"),
        (name = "internal", description = "Unauthenticated service endpoints"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_jwt` scheme the v1 operations refer to.
struct BearerJwt;

impl Modify for BearerJwt {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// GET /swagger/doc.json
pub async fn doc_json() -> impl IntoResponse {
    ([(header::CACHE_CONTROL, "no-store")], Json(ApiDoc::openapi()))
}

/// GET /swagger/index.html - renders doc.json from the CDN build of Stoplight Elements
pub async fn docs_page() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>IDM API</title>
  <script src="https://unpkg.com/@stoplight/elements@latest/web-components.min.js"></script>
  <link rel="stylesheet" href="https://unpkg.com/@stoplight/elements@latest/styles.min.css">
</head>
<body>
  <elements-api apiDescriptionUrl="/swagger/doc.json" router="hash" layout="sidebar"></elements-api>
</body>
</html>"#,
    )
}
