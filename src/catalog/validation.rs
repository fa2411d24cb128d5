// Record Validation Module
//
// This module checks records against the schema of the source they are
// inserted into.

use crate::catalog::field::Field;
use crate::catalog::schema::Schema;
use crate::catalog::validation_error::{ValidationError, ValidationResult};
use crate::query::executor::result::{DataValue, Record};

/// The type validator checks values and records against a schema
pub struct TypeValidator;

impl TypeValidator {
    /// Validate a value against a field's data type
    pub fn validate_value(value: &DataValue, field: &Field) -> ValidationResult<()> {
        if value.is_null() {
            return if field.is_nullable() {
                Ok(())
            } else {
                Err(ValidationError::NullValueNotAllowed(field.name().to_string()))
            };
        }

        if field.data_type().accepts(value) {
            Ok(())
        } else {
            Err(ValidationError::TypeMismatch {
                field: field.name().to_string(),
                expected: field.data_type().to_string(),
                actual: value.type_name().to_string(),
            })
        }
    }

    /// Validate all fields of a record against a schema.
    ///
    /// Undeclared fields are rejected. A declared field missing from the
    /// record is treated as absent, which only nullable fields allow.
    pub fn validate_record(record: &Record, schema: &Schema) -> ValidationResult<()> {
        for (name, value) in record.iter() {
            match schema.get_field(name) {
                Some(field) => Self::validate_value(value, field)?,
                None => return Err(ValidationError::UnknownField(name.to_string())),
            }
        }

        for field in schema.fields() {
            if !field.is_nullable() && !record.contains_field(field.name()) {
                return Err(ValidationError::MissingValueForNotNullField(field.name().to_string()));
            }
        }

        Ok(())
    }
}
