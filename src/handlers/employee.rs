use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::app::AppState;
use crate::auth::{IDM_ADMIN, IDM_USER};
use crate::database::models::Employee;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::dto::{
    IdRequest, IdsRequest, NameRequest, PageKeySetRequest, PageKeySetResponse, PageRequest,
    PageResponse,
};

use super::bad_request;

const READ_ROLES: &[&str] = &[IDM_ADMIN, IDM_USER];
const WRITE_ROLES: &[&str] = &[IDM_ADMIN];

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    #[serde(default)]
    pub page_number: i64,
    pub page_size: i64,
    pub text_filter: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct KeySetQuery {
    #[serde(default)]
    pub last_id: i64,
    pub page_size: i64,
    pub text_filter: Option<String>,
    pub is_next: Option<bool>,
}

/// POST /api/v1/employees - create, returns the new id
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    tag = "employees",
    request_body = NameRequest,
    responses(
        (status = 200, description = "Id of the new employee", body = i64),
        (status = 400, description = "Invalid name or name already taken"),
        (status = 403, description = "Caller lacks IDM_ADMIN"),
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
    let id = state.employees.add(request).await?;
    Ok(ApiResponse::success(id))
}

/// GET /api/v1/employees
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    tag = "employees",
    responses(
        (status = 200, description = "Every employee", body = Vec<Employee>),
        (status = 504, description = "Listing exceeded the configured wait"),
    ),
    security(("bearer_jwt" = []))
)]
pub async fn get_all(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Employee>> {
    user.require_any(READ_ROLES)?;
    Ok(ApiResponse::success(state.employees.get_all().await?))
}

/// GET /api/v1/employees/page?pageNumber=&pageSize=&textFilter=
#[utoipa::path(
    get,
    path = "/api/v1/employees/page",
    tag = "employees",
    params(PageQuery),
    responses(
        (status = 200, description = "One offset page and the filtered total", body = PageResponse<Employee>),
        (status = 400, description = "Page parameters out of range"),
    ),
    security(("bearer_jwt" = []))
)]
pub async fn get_page(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<PageResponse<Employee>> {
    user.require_any(READ_ROLES)?;
    let Query(query) = query.map_err(bad_request)?;
    let page = state
        .employees
        .get_page(PageRequest {
            page_size: query.page_size,
            page_number: query.page_number,
            text_filter: query.text_filter,
        })
        .await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/v1/employees/page-key-set?lastId=&pageSize=&textFilter=
#[utoipa::path(
    get,
    path = "/api/v1/employees/page-key-set",
    tag = "employees",
    params(KeySetQuery),
    responses(
        (status = 200, description = "Rows after the cursor and the filtered total", body = PageKeySetResponse<Employee>),
        (status = 400, description = "Cursor or page size out of range"),
    ),
    security(("bearer_jwt" = []))
)]
pub async fn get_key_set_page(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<KeySetQuery>, QueryRejection>,
) -> ApiResult<PageKeySetResponse<Employee>> {
    user.require_any(READ_ROLES)?;
    let Query(query) = query.map_err(bad_request)?;
    let page = state
        .employees
        .get_key_set_page(PageKeySetRequest {
            last_id: query.last_id,
            page_size: query.page_size,
            is_next: query.is_next.unwrap_or(true),
            text_filter: query.text_filter,
        })
        .await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/v1/employees/:id
#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}",
    tag = "employees",
    params(("id" = i64, Path, description = "Employee id")),
    responses(
        (status = 200, description = "The employee, or success=false when absent", body = Employee),
        (status = 400, description = "Id is not a positive integer"),
    ),
    security(("bearer_jwt" = []))
)]
pub async fn find_by_id(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Employee> {
    user.require_any(READ_ROLES)?;
    let Path(id) = id.map_err(bad_request)?;
    Ok(ApiResponse::success(state.employees.find_by_id(IdRequest { id }).await?))
}

/// POST /api/v1/employees/search - batch lookup by ids
#[utoipa::path(
    post,
    path = "/api/v1/employees/search",
    tag = "employees",
    request_body = IdsRequest,
    responses(
        (status = 200, description = "Employees whose ids exist", body = Vec<Employee>),
        (status = 400, description = "Empty list or non-positive id"),
    ),
    security(("bearer_jwt" = []))
)]
pub async fn search(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<IdsRequest>, JsonRejection>,
) -> ApiResult<Vec<Employee>> {
    user.require_any(READ_ROLES)?;
    let Json(request) = body.map_err(bad_request)?;
    Ok(ApiResponse::success(state.employees.get_group_by_id(request).await?))
}

/// DELETE /api/v1/employees/:id
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{id}",
    tag = "employees",
    params(("id" = i64, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Deleted, or already absent"),
        (status = 403, description = "Caller lacks IDM_ADMIN"),
    ),
    security(("bearer_jwt" = []))
)]
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    user.require_any(WRITE_ROLES)?;
    let Path(id) = id.map_err(bad_request)?;
    state.employees.delete(IdRequest { id }).await?;
    Ok(ApiResponse::success(()))
}

/// DELETE /api/v1/employees/batch-delete
#[utoipa::path(
    delete,
    path = "/api/v1/employees/batch-delete",
    tag = "employees",
    request_body = IdsRequest,
    responses(
        (status = 200, description = "Listed employees removed"),
        (status = 403, description = "Caller lacks IDM_ADMIN"),
    ),
    security(("bearer_jwt" = []))
)]
pub async fn delete_group(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<IdsRequest>, JsonRejection>,
) -> ApiResult<()> {
    user.require_any(WRITE_ROLES)?;
    let Json(request) = body.map_err(bad_request)?;
    state.employees.delete_group(request).await?;
    Ok(ApiResponse::success(()))
}
