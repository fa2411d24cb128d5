// Queryable: composable, lazily evaluated query pipelines over typed records

pub mod catalog;
pub mod common;
pub mod query;

// Re-export key items for convenient access
pub use catalog::{DataType, Field, InMemoryTable, RecordSource, Schema};
pub use common::config::{EvaluationConfig, NullKeyPolicy, NullOrdering};
pub use query::executor::result::{DataValue, QueryError, QueryResult, Record};
pub use query::executor::terminal::TerminalOutcome;
pub use query::executor::truth::Truth;
pub use query::expression::{call, captured, construct, current, field, lit, null, Expression};
pub use query::operation::{JoinSelector, TerminalKind, TerminalOperation};
pub use query::source::QuerySource;
