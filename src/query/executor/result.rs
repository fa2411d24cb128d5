// Query Result Implementation
//
// This module defines the value, record and error types that flow through
// query pipelines.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;
use linked_hash_map::LinkedHashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::DataType;
use crate::query::expression::coercion;

/// A single value flowing through a pipeline.
///
/// `Null` is the absent-value sentinel: it is distinct from every present
/// value, including empty text and zero.
///
/// Equality and hashing are structural and kind-sensitive: `Integer(10)` and
/// `Float(10.0)` are different values. Comparison operators inside predicates
/// apply numeric promotion instead (see [`DataValue::compare`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Date(NaiveDate),
    Text(String),
    Decimal(Decimal),
    Float(f64),
    List(Vec<DataValue>),
    Record(Record),
}

/// Bit pattern used for float equality and hashing: both zeros share one
/// pattern and every NaN shares another, so `Eq` stays reflexive and agrees
/// with `Hash`.
fn float_identity(f: f64) -> u64 {
    if f == 0.0 {
        0.0f64.to_bits()
    } else if f.is_nan() {
        f64::NAN.to_bits()
    } else {
        f.to_bits()
    }
}

impl PartialEq for DataValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DataValue::Null, DataValue::Null) => true,
            (DataValue::Boolean(a), DataValue::Boolean(b)) => a == b,
            (DataValue::Integer(a), DataValue::Integer(b)) => a == b,
            (DataValue::Date(a), DataValue::Date(b)) => a == b,
            (DataValue::Text(a), DataValue::Text(b)) => a == b,
            (DataValue::Decimal(a), DataValue::Decimal(b)) => a == b,
            (DataValue::Float(a), DataValue::Float(b)) => float_identity(*a) == float_identity(*b),
            (DataValue::List(a), DataValue::List(b)) => a == b,
            (DataValue::Record(a), DataValue::Record(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for DataValue {}

impl Hash for DataValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            DataValue::Null => 0.hash(state),
            DataValue::Boolean(b) => { 1.hash(state); b.hash(state); }
            DataValue::Integer(i) => { 2.hash(state); i.hash(state); }
            DataValue::Date(d) => { 3.hash(state); d.hash(state); }
            DataValue::Text(s) => { 4.hash(state); s.hash(state); }
            DataValue::Decimal(d) => { 5.hash(state); d.hash(state); }
            DataValue::Float(f) => { 6.hash(state); float_identity(*f).hash(state); }
            DataValue::List(items) => { 7.hash(state); items.hash(state); }
            DataValue::Record(r) => { 8.hash(state); r.hash(state); }
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Null => write!(f, "NULL"),
            DataValue::Text(s) => write!(f, "\"{}\"", s),
            DataValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            DataValue::Record(r) => write!(f, "{}", r),
            other => write!(f, "{}", other.to_text()),
        }
    }
}

impl DataValue {
    /// Returns true for the absent-value sentinel.
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// Name of the value's kind, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::Null => "Null",
            DataValue::Boolean(_) => "Boolean",
            DataValue::Integer(_) => "Integer",
            DataValue::Date(_) => "Date",
            DataValue::Text(_) => "Text",
            DataValue::Decimal(_) => "Decimal",
            DataValue::Float(_) => "Float",
            DataValue::List(_) => "List",
            DataValue::Record(_) => "Record",
        }
    }

    /// Catalog type of a present value; `None` for `Null`.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            DataValue::Null => None,
            DataValue::Boolean(_) => Some(DataType::Boolean),
            DataValue::Integer(_) => Some(DataType::Integer),
            DataValue::Date(_) => Some(DataType::Date),
            DataValue::Text(_) => Some(DataType::Text),
            DataValue::Decimal(_) => Some(DataType::Decimal),
            DataValue::Float(_) => Some(DataType::Float),
            DataValue::List(_) => Some(DataType::List),
            DataValue::Record(_) => Some(DataType::Record),
        }
    }

    /// Canonical textual representation used by string concatenation.
    /// Absent values render as the empty string.
    pub fn to_text(&self) -> String {
        match self {
            DataValue::Null => String::new(),
            DataValue::Boolean(b) => b.to_string(),
            DataValue::Integer(i) => i.to_string(),
            DataValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            DataValue::Text(s) => s.clone(),
            DataValue::Decimal(d) => d.to_string(),
            DataValue::Float(f) => f.to_string(),
            DataValue::List(_) | DataValue::Record(_) => self.to_string(),
        }
    }

    /// Compare two values for ordering.
    ///
    /// `Null` sorts before every present value. Numeric kinds are promoted
    /// through the coercion table before comparing; text compares ordinally.
    /// Incompatible kinds are a `TypeError`.
    pub fn compare(&self, other: &Self) -> QueryResult<Ordering> {
        match (self, other) {
            (DataValue::Null, DataValue::Null) => Ok(Ordering::Equal),
            (DataValue::Null, _) => Ok(Ordering::Less),
            (_, DataValue::Null) => Ok(Ordering::Greater),
            (DataValue::Boolean(a), DataValue::Boolean(b)) => Ok(a.cmp(b)),
            (DataValue::Text(a), DataValue::Text(b)) => Ok(a.cmp(b)),
            (DataValue::Date(a), DataValue::Date(b)) => Ok(a.cmp(b)),
            (DataValue::List(a), DataValue::List(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.compare(y)? {
                        Ordering::Equal => continue,
                        ord => return Ok(ord),
                    }
                }
                Ok(a.len().cmp(&b.len()))
            }
            (a, b) => match coercion::compare_numeric(a, b)? {
                Some(ord) => Ok(ord),
                None => Err(QueryError::TypeError(format!(
                    "Cannot compare incompatible types: {} and {}",
                    a.type_name(),
                    b.type_name()
                ))),
            },
        }
    }

    /// Equality as used by the `=` and `!=` operators on present values:
    /// numeric kinds are promoted, other kinds must match exactly.
    pub fn equals(&self, other: &Self) -> QueryResult<bool> {
        match (self, other) {
            (DataValue::Record(a), DataValue::Record(b)) => Ok(a == b),
            (DataValue::List(a), DataValue::List(b)) => Ok(a == b),
            (a, b) => Ok(a.compare(b)? == Ordering::Equal),
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            DataValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DataValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            DataValue::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[DataValue]> {
        match self {
            DataValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Boolean(value)
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Integer(value)
    }
}

impl From<i32> for DataValue {
    fn from(value: i32) -> Self {
        DataValue::Integer(i64::from(value))
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Float(value)
    }
}

impl From<Decimal> for DataValue {
    fn from(value: Decimal) -> Self {
        DataValue::Decimal(value)
    }
}

impl From<NaiveDate> for DataValue {
    fn from(value: NaiveDate) -> Self {
        DataValue::Date(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::Text(value.to_string())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::Text(value)
    }
}

impl From<Record> for DataValue {
    fn from(value: Record) -> Self {
        DataValue::Record(value)
    }
}

impl<T: Into<DataValue>> From<Vec<T>> for DataValue {
    fn from(values: Vec<T>) -> Self {
        DataValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<DataValue>> From<Option<T>> for DataValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(DataValue::Null, Into::into)
    }
}

/// One typed tuple of named fields. Field order is preserved and is part of
/// the record's structural identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: LinkedHashMap<String, DataValue>,
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fields.len().hash(state);
        for (name, value) in self.fields.iter() {
            name.hash(state);
            value.hash(state);
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ ")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        write!(f, " }}")
    }
}

impl Record {
    /// Create a new empty record
    pub fn new() -> Self {
        Record { fields: LinkedHashMap::new() }
    }

    /// Builder-style field assignment
    pub fn with(mut self, name: impl Into<String>, value: impl Into<DataValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a field, keeping its position if it already exists
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<DataValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.get_mut(&name) {
            Some(slot) => *slot = value,
            None => {
                self.fields.insert(name, value);
            }
        }
    }

    /// Get a field value by name
    pub fn get(&self, name: &str) -> Option<&DataValue> {
        self.fields.get(name)
    }

    pub fn contains_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names in declaration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Field values in declaration order
    pub fn values(&self) -> impl Iterator<Item = &DataValue> {
        self.fields.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DataValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Represents query execution error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// `single`/`first` found no qualifying element
    #[error("Sequence contains no matching element")]
    NoMatch,
    /// `single`/`single_or_default` found more than one qualifying element
    #[error("Sequence contains more than one matching element")]
    MultipleMatches,
    /// Malformed expression, unsupported function or misplaced operator
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Field access against a record that has no such field
    #[error("Field not found: {0}")]
    FieldNotFound(String),
    /// Operand kinds that an operator or function cannot accept
    #[error("Type error: {0}")]
    TypeError(String),
    #[error("Numeric overflow")]
    NumericOverflow,
    #[error("Division by zero")]
    DivisionByZero,
    /// Failure reported by a data-source adapter
    #[error("Source error: {0}")]
    SourceError(String),
    /// Operator protocol misuse, such as pulling before `init`
    #[error("Execution error: {0}")]
    ExecutionError(String),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
