use validator::{Validate, ValidationError, ValidationErrors};

use crate::services::error::ServiceError;

/// Run the declarative constraints on `request`.
///
/// Every failing field is reported in one message, sorted by field name:
/// `"name: length (min 2, max 155); page_size: range (min 1, max 100)"`.
pub fn validate<T: Validate>(request: &T) -> Result<(), ServiceError> {
    request
        .validate()
        .map_err(|errors| ServiceError::validation(describe(&errors)))
}

pub fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .iter()
        .flat_map(|(field, errs)| errs.iter().map(move |e| format!("{}: {}", field, describe_one(e))))
        .collect::<Vec<_>>()
        .join("; ")
}

fn describe_one(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    let bounds: Vec<String> = ["min", "max"]
        .iter()
        .filter_map(|key| error.params.get(*key).map(|v| format!("{} {}", key, v)))
        .collect();
    if bounds.is_empty() {
        error.code.to_string()
    } else {
        format!("{} ({})", error.code, bounds.join(", "))
    }
}
