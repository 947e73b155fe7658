use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unknown attribute(s) '{}' in entity '{entity}'", attributes.join(", "))]
    UnknownAttribute {
        entity: String,
        attributes: Vec<String>,
    },

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Invalid value format: {0}")]
    InvalidValueFormat(String),

    #[error("Invalid range format: {0}")]
    InvalidRangeFormat(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Table '{0}' already exists")]
    TableExists(String),

    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("Execution error: {0}")]
    ExecutionError(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Who can fix a failure: the caller (bad input) or the operator (broken store).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Client,
    Infrastructure,
}

impl DbError {
    pub fn unknown_attribute(entity: &str, attribute: impl Into<String>) -> Self {
        Self::UnknownAttribute {
            entity: entity.to_string(),
            attributes: vec![attribute.into()],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidRequest(_)
            | Self::UnknownAttribute { .. }
            | Self::UnsupportedOperator(_)
            | Self::TypeMismatch(_)
            | Self::InvalidValueFormat(_)
            | Self::InvalidRangeFormat(_)
            | Self::NotFound(_)
            | Self::Unauthorized(_)
            | Self::ConstraintViolation(_) => ErrorCategory::Client,

            Self::TableExists(_)
            | Self::TableNotFound(_)
            | Self::StoreUnavailable(_)
            | Self::LockError(_)
            | Self::ExecutionError(_) => ErrorCategory::Infrastructure,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.category() == ErrorCategory::Client
    }

    /// HTTP-equivalent status for the dashboard API.
    ///
    /// Infrastructure failures use 555 so the front-end can tell them apart
    /// from regular 5xx responses produced by the web server itself.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnknownAttribute { .. } | Self::NotFound(_) => 404,
            Self::Unauthorized(_) => 401,
            _ if self.is_client_error() => 422,
            _ => 555,
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for DbError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}
