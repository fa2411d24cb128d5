// Field Module
//
// This module defines the Field type that describes one named field of a record.

use serde::{Deserialize, Serialize};

use super::schema::DataType;

/// Represents a field of a record source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Field name
    name: String,
    /// Field data type
    data_type: DataType,
    /// Whether this field may hold the absent value
    nullable: bool,
}

impl Field {
    /// Create a new field
    pub fn new(name: &str, data_type: DataType, nullable: bool) -> Self {
        Field {
            name: name.to_string(),
            data_type,
            nullable,
        }
    }

    /// Get the field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the field data type
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Check if the field can hold absent values
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }
}
