use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct NameRequest {
    #[schema(min_length = 2, max_length = 155)]
    #[validate(length(min = 2, max = 155))]
    pub name: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Validate)]
pub struct IdRequest {
    #[validate(range(min = 1))]
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct IdsRequest {
    #[schema(min_items = 1)]
    #[validate(length(min = 1), custom(function = "all_positive"))]
    pub ids: Vec<i64>,
}

fn all_positive(ids: &[i64]) -> Result<(), ValidationError> {
    if ids.iter().all(|id| *id > 0) {
        Ok(())
    } else {
        Err(ValidationError::new("positive"))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct PageRequest {
    #[validate(range(min = 1, max = 100))]
    pub page_size: i64,
    #[validate(range(min = 0))]
    pub page_number: i64,
    pub text_filter: Option<String>,
}

impl PageRequest {
    /// Rows to skip, `None` when the product overflows.
    pub fn offset(&self) -> Option<i64> {
        self.page_number.checked_mul(self.page_size)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct PageKeySetRequest {
    #[validate(range(min = 0))]
    pub last_id: i64,
    #[validate(range(min = 1, max = 100))]
    pub page_size: i64,
    /// Only forward traversal is served; `false` is accepted and ignored.
    #[serde(default = "forward")]
    pub is_next: bool,
    pub text_filter: Option<String>,
}

fn forward() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PageResponse<T> {
    pub result: Vec<T>,
    pub page_size: i64,
    pub page_number: i64,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PageKeySetResponse<T> {
    pub result: Vec<T>,
    pub last_id: i64,
    pub total: i64,
}

/// Blank filters mean "match everything".
pub fn normalize_filter(text_filter: Option<&str>) -> Option<&str> {
    text_filter.filter(|s| !s.trim().is_empty())
}
