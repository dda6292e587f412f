use thiserror::Error;

use crate::database::DatabaseError;

/// Failure classes callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    AlreadyExists,
    NotFound,
    Timeout,
    Store,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{entity} with name '{name}' already exists")]
    AlreadyExists { entity: &'static str, name: String },

    #[error("{0}")]
    NotFound(String),

    #[error("timeout exceeded during {0}")]
    Timeout(String),

    #[error("{context}: {source}")]
    Store {
        context: String,
        #[source]
        source: DatabaseError,
    },
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn already_exists(entity: &'static str, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity,
            name: name.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout(operation.into())
    }

    /// Wrap a store failure with a short operation prefix, e.g. `"FindById(7)"`.
    pub fn store(context: impl Into<String>, source: DatabaseError) -> Self {
        Self::Store {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Store { .. } => ErrorKind::Store,
        }
    }

    /// Timeouts and store failures may be transient. Caller faults are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Timeout | ErrorKind::Store)
    }
}
