//! Catalog Module
//!
//! This module describes the shape of record sources and defines the boundary
//! through which pipelines read records.

pub mod field;
pub mod schema;
pub mod source;
pub mod validation;
pub mod validation_error;

// Re-export key types
pub use self::field::Field;
pub use self::schema::{DataType, Schema};
pub use self::source::{InMemoryTable, RecordSource};
pub use self::validation::TypeValidator;
pub use self::validation_error::{ValidationError, ValidationResult};
