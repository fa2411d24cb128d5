use thiserror::Error;

use crate::query::executor::result::QueryError;

/// Validation errors raised when a record does not fit a schema
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Type mismatch for field {field}: expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },
    #[error("NULL value not allowed for non-nullable field {0}")]
    NullValueNotAllowed(String),
    #[error("Field not declared by schema: {0}")]
    UnknownField(String),
    #[error("Missing value for non-nullable field: {0}")]
    MissingValueForNotNullField(String),
}

/// Type validation result
pub type ValidationResult<T> = Result<T, ValidationError>;

impl From<ValidationError> for QueryError {
    fn from(err: ValidationError) -> Self {
        QueryError::SourceError(err.to_string())
    }
}
