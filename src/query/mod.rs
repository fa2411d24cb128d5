// Query Processing Module
//
// This module contains the expression model, the composable query source and
// the pull-based execution machinery behind it.

pub mod executor;
pub mod expression;
pub mod operation;
pub mod source;

// Export key public interfaces
pub use executor::engine::ExecutionEngine;
pub use executor::result::{QueryError, QueryResult};
pub use operation::{JoinMode, JoinSelector, Operation, SortDirection, SortKey, TerminalKind, TerminalOperation};
pub use source::{QuerySource, Rows};
