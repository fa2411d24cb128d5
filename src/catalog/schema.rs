// Schema Module
//
// This module defines the DataType and Schema types that describe the fields
// a record source exposes.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::field::Field;
use crate::query::executor::result::DataValue;

/// Field types a source can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Boolean,
    Integer,
    Decimal,
    Float,
    Text,
    Date,
    List,
    Record,
}

impl DataType {
    /// Check whether a present value may be stored in a field of this type.
    /// Integers widen into decimal and float fields.
    pub fn accepts(&self, value: &DataValue) -> bool {
        match value.data_type() {
            None => true,
            Some(actual) if actual == *self => true,
            Some(DataType::Integer) => matches!(self, DataType::Decimal | DataType::Float),
            Some(_) => false,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Boolean => "BOOLEAN",
            DataType::Integer => "INTEGER",
            DataType::Decimal => "DECIMAL",
            DataType::Float => "FLOAT",
            DataType::Text => "TEXT",
            DataType::Date => "DATE",
            DataType::List => "LIST",
            DataType::Record => "RECORD",
        };
        write!(f, "{}", name)
    }
}

/// Describes the fields available on records produced by a source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Source name
    name: String,
    /// Fields in declaration order
    fields: Vec<Field>,
    /// Field name to index lookup
    #[serde(skip)]
    field_map: HashMap<String, usize>,
}

impl Schema {
    /// Create a new schema with the given name and fields
    pub fn new(name: &str, fields: Vec<Field>) -> Self {
        let field_map = fields
            .iter()
            .enumerate()
            .map(|(i, field)| (field.name().to_string(), i))
            .collect();
        Schema {
            name: name.to_string(),
            fields,
            field_map,
        }
    }

    /// Get the source name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get all fields
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Get a field by name
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        match self.field_map.get(name) {
            Some(&idx) => self.fields.get(idx),
            // Deserialized schemas skip the lookup table
            None => self.fields.iter().find(|f| f.name() == name),
        }
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.get_field(name).is_some()
    }

    /// Get a string representation of the schema
    pub fn schema_string(&self) -> String {
        let columns: Vec<String> = self
            .fields
            .iter()
            .map(|f| {
                if f.is_nullable() {
                    format!("{} {}", f.name(), f.data_type())
                } else {
                    format!("{} {} NOT NULL", f.name(), f.data_type())
                }
            })
            .collect();
        format!("{}({})", self.name, columns.join(", "))
    }
}
