// Record Source Module
//
// This module defines the boundary consumed from data-source adapters and an
// in-memory adapter backed by a vector of records.

use std::fmt;

use log::trace;
use parking_lot::RwLock;

use crate::catalog::schema::Schema;
use crate::catalog::validation::TypeValidator;
use crate::query::executor::result::{DataValue, QueryResult, Record};
use crate::query::expression::coercion;

/// A data source that can produce its full ordered sequence of records
pub trait RecordSource: Send + Sync {
    /// Source name, used in logs and error messages
    fn name(&self) -> &str;

    /// Describe the fields available on produced records, when known
    fn schema(&self) -> Option<&Schema>;

    /// Produce every record in source order
    fn materialize(&self) -> QueryResult<Vec<Record>>;
}

/// Record store held in memory
pub struct InMemoryTable {
    schema: Schema,
    rows: RwLock<Vec<Record>>,
}

impl InMemoryTable {
    /// Create an empty table for the given schema
    pub fn new(schema: Schema) -> Self {
        InMemoryTable {
            schema,
            rows: RwLock::new(Vec::new()),
        }
    }

    /// Append a record after validating it against the schema. Stored
    /// records carry every schema field in declaration order; omitted
    /// nullable fields are stored as absent.
    pub fn insert(&self, record: Record) -> QueryResult<()> {
        TypeValidator::validate_record(&record, &self.schema)?;
        let row = self.conform(record)?;
        self.rows.write().push(row);
        Ok(())
    }

    /// Append records in order. Every record is validated before any is
    /// stored, so a failure leaves the table unchanged.
    pub fn insert_all(&self, records: impl IntoIterator<Item = Record>) -> QueryResult<()> {
        let records: Vec<Record> = records.into_iter().collect();
        for record in &records {
            TypeValidator::validate_record(record, &self.schema)?;
        }
        let rows = records
            .into_iter()
            .map(|r| self.conform(r))
            .collect::<QueryResult<Vec<_>>>()?;
        self.rows.write().extend(rows);
        Ok(())
    }

    /// Lay a validated record out in schema order. Numeric values are
    /// widened to the declared kind, so every present value of a column has
    /// one kind and structural equality agrees with `=`.
    fn conform(&self, record: Record) -> QueryResult<Record> {
        let mut row = Record::new();
        for field in self.schema.fields() {
            let value = match record.get(field.name()) {
                None | Some(DataValue::Null) => DataValue::Null,
                Some(value) => match coercion::kind_for(field.data_type()) {
                    Some(kind) => coercion::convert(value, kind)?.into(),
                    None => value.clone(),
                },
            };
            row.set(field.name(), value);
        }
        Ok(row)
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

impl RecordSource for InMemoryTable {
    fn name(&self) -> &str {
        self.schema.name()
    }

    fn schema(&self) -> Option<&Schema> {
        Some(&self.schema)
    }

    fn materialize(&self) -> QueryResult<Vec<Record>> {
        let rows = self.rows.read();
        trace!("Materializing {} rows from '{}'", rows.len(), self.schema.name());
        Ok(rows.clone())
    }
}

impl fmt::Debug for InMemoryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryTable")
            .field("schema", &self.schema.schema_string())
            .field("rows", &self.len())
            .finish()
    }
}
