use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};

use crate::app::AppState;
use crate::auth::{IDM_ADMIN, IDM_USER};
use crate::database::models::Role;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::dto::{IdRequest, IdsRequest, NameRequest};

use super::bad_request;

const READ_ROLES: &[&str] = &[IDM_ADMIN, IDM_USER];
const WRITE_ROLES: &[&str] = &[IDM_ADMIN];

/// POST /api/v1/roles
#[utoipa::path(
    post,
    path = "/api/v1/roles",
    tag = "roles",
    request_body = NameRequest,
    responses(
        (status = 200, description = "Id of the new role", body = i64),
        (status = 400, description = "Invalid name"),
    ),
    security(("bearer_jwt" = []))
)]
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<NameRequest>, JsonRejection>,
) -> ApiResult<i64> {
    user.require_any(WRITE_ROLES)?;
    let Json(request) = body.map_err(bad_request)?;
    Ok(ApiResponse::success(state.roles.add(request).await?))
}

/// GET /api/v1/roles
#[utoipa::path(
    get,
    path = "/api/v1/roles",
    tag = "roles",
    responses((status = 200, description = "Every role", body = Vec<Role>)),
    security(("bearer_jwt" = []))
)]
pub async fn get_all(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Role>> {
    user.require_any(READ_ROLES)?;
    Ok(ApiResponse::success(state.roles.get_all().await?))
}

/// GET /api/v1/roles/:id
#[utoipa::path(
    get,
    path = "/api/v1/roles/{id}",
    tag = "roles",
    params(("id" = i64, Path, description = "Role id")),
    responses((status = 200, description = "The role, or success=false when absent", body = Role)),
    security(("bearer_jwt" = []))
)]
pub async fn find_by_id(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Role> {
    user.require_any(READ_ROLES)?;
    let Path(id) = id.map_err(bad_request)?;
    Ok(ApiResponse::success(state.roles.find_by_id(IdRequest { id }).await?))
}

/// POST /api/v1/roles/search
#[utoipa::path(
    post,
    path = "/api/v1/roles/search",
    tag = "roles",
    request_body = IdsRequest,
    responses((status = 200, description = "Roles whose ids exist", body = Vec<Role>)),
    security(("bearer_jwt" = []))
)]
pub async fn search(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<IdsRequest>, JsonRejection>,
) -> ApiResult<Vec<Role>> {
    user.require_any(READ_ROLES)?;
    let Json(request) = body.map_err(bad_request)?;
    Ok(ApiResponse::success(state.roles.get_group_by_id(request).await?))
}

/// DELETE /api/v1/roles/:id
#[utoipa::path(
    delete,
    path = "/api/v1/roles/{id}",
    tag = "roles",
    params(("id" = i64, Path, description = "Role id")),
    responses((status = 200, description = "Deleted, or already absent")),
    security(("bearer_jwt" = []))
)]
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    user.require_any(WRITE_ROLES)?;
    let Path(id) = id.map_err(bad_request)?;
    state.roles.delete(IdRequest { id }).await?;
    Ok(ApiResponse::success(()))
}

/// DELETE /api/v1/roles/batch-delete
#[utoipa::path(
    delete,
    path = "/api/v1/roles/batch-delete",
    tag = "roles",
    request_body = IdsRequest,
    responses((status = 200, description = "Listed roles removed")),
    security(("bearer_jwt" = []))
)]
pub async fn delete_group(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<IdsRequest>, JsonRejection>,
) -> ApiResult<()> {
    user.require_any(WRITE_ROLES)?;
    let Json(request) = body.map_err(bad_request)?;
    state.roles.delete_group(request).await?;
    Ok(ApiResponse::success(()))
}
