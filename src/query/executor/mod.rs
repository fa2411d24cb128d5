// Query Executor Module
//
// This module is responsible for evaluating query chains and producing results.
// It implements the iterator-based execution model for query processing.

pub mod engine;
pub mod expression_eval;
pub mod operators;
pub mod result;
pub mod terminal;
pub mod truth;

// Export key types
pub use self::engine::ExecutionEngine;
pub use self::expression_eval::{evaluate_expression, evaluate_predicate};
pub use self::operators::Operator;
pub use self::result::{DataValue, QueryError, QueryResult, Record};
pub use self::terminal::TerminalOutcome;
pub use self::truth::Truth;
