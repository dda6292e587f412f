use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::{from_fn_with_state, map_response},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::{EmployeeRepository, HealthCheck, RoleRepository};
use crate::error::ApiError;
use crate::handlers::{employee, info, role};
use crate::middleware::jwt_auth_middleware;
use crate::openapi;
use crate::services::transaction::panic_message;
use crate::services::{EmployeeService, RoleService};

/// Shared handles injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub employees: EmployeeService,
    pub roles: RoleService,
    pub health: Arc<dyn HealthCheck>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        employees: Arc<dyn EmployeeRepository>,
        roles: Arc<dyn RoleRepository>,
        health: Arc<dyn HealthCheck>,
    ) -> Self {
        let get_all_timeout = config.api.get_all_timeout();
        Self {
            config: Arc::new(config),
            employees: EmployeeService::new(employees, get_all_timeout),
            roles: RoleService::new(roles),
            health,
        }
    }
}

pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .merge(v1_routes(state.clone()))
        .merge(internal_routes())
        .with_state(state.clone());

    let api = &state.config.api;
    // The timeout wraps routes directly; its inner body must be `Default`.
    let router = router
        .layer(
            ServiceBuilder::new()
                .layer(RequestBodyLimitLayer::new(api.max_request_size_bytes))
                .layer(TimeoutLayer::new(Duration::from_secs(api.request_timeout_secs))),
        )
        .layer(map_response(uniform_error_body))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(CatchPanicLayer::custom(handle_panic)),
        );

    if state.config.security.enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

fn v1_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/employees", post(employee::create).get(employee::get_all))
        .route("/api/v1/employees/page", get(employee::get_page))
        .route("/api/v1/employees/page-key-set", get(employee::get_key_set_page))
        .route("/api/v1/employees/search", post(employee::search))
        .route("/api/v1/employees/batch-delete", delete(employee::delete_group))
        .route(
            "/api/v1/employees/:id",
            get(employee::find_by_id).delete(employee::delete),
        )
        .route("/api/v1/roles", post(role::create).get(role::get_all))
        .route("/api/v1/roles/search", post(role::search))
        .route("/api/v1/roles/batch-delete", delete(role::delete_group))
        .route("/api/v1/roles/:id", get(role::find_by_id).delete(role::delete))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn internal_routes() -> Router<AppState> {
    Router::new()
        .route("/api/internal/info", get(info::info))
        .route("/api/internal/health", get(info::health))
        .route("/swagger/doc.json", get(openapi::doc_json))
        .route("/swagger/index.html", get(openapi::docs_page))
}

fn make_span(req: &Request<Body>) -> tracing::Span {
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("n/a");
    tracing::info_span!(
        "http_request",
        method = %req.method(),
        uri = %req.uri().path(),
        request_id = %request_id,
    )
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic_message(err.as_ref());
    tracing::error!(panic_msg = %detail, "Handler panicked");
    ApiError::internal_server_error("An error occurred while processing your request").into_response()
}

/// Timeout and body-limit layers answer with bare status codes; give them the API envelope.
async fn uniform_error_body(response: Response) -> Response {
    match response.status() {
        StatusCode::REQUEST_TIMEOUT => ApiError::RequestTimeout("request timed out".to_string()).into_response(),
        StatusCode::PAYLOAD_TOO_LARGE => {
            ApiError::PayloadTooLarge("request body too large".to_string()).into_response()
        }
        _ => response,
    }
}
