// handlers/mod.rs - one module per resource
//
// /api/v1/employees and /api/v1/roles sit behind the JWT middleware and gate
// on realm roles per operation. /api/internal/* is unauthenticated.
pub mod employee;
pub mod info;
pub mod role;

use crate::error::ApiError;

/// Extractor rejections (bad JSON, bad path or query params) become 400s in the API envelope.
pub(crate) fn bad_request(rejection: impl std::fmt::Display) -> ApiError {
    ApiError::bad_request(rejection.to_string())
}
