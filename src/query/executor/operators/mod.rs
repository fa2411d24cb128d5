// Query Operators Module
//
// This module defines the operators used for query execution in the
// iterator-based execution model.

pub mod distinct;
pub mod filter;
pub mod join;
pub mod limit;
pub mod project;
pub mod scan;
pub mod sort;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::catalog::RecordSource;
use crate::common::config::{NullKeyPolicy, NullOrdering};
use crate::query::executor::result::{DataValue, QueryResult};
use crate::query::expression::ast::Expression;
use crate::query::operation::{JoinMode, JoinSelector, SortKey};

/// The Operator trait defines the interface for all query execution operators
/// in the iterator-based execution model. Each operator pulls elements from
/// its inputs and passes them to the next operator in the tree.
pub trait Operator: Send {
    /// Initialize the operator before execution
    fn init(&mut self) -> QueryResult<()>;

    /// Get the next element from this operator
    fn next(&mut self) -> QueryResult<Option<DataValue>>;

    /// Close the operator and release any resources
    fn close(&mut self) -> QueryResult<()>;
}

/// Shared handle to an operator in a tree
pub type OperatorRef = Arc<Mutex<dyn Operator>>;

// Factory functions for creating operators
pub fn create_scan(source: Arc<dyn RecordSource>) -> QueryResult<OperatorRef> {
    scan::create_scan(source)
}

pub fn create_filter(input: OperatorRef, predicate: Expression) -> QueryResult<OperatorRef> {
    filter::create_filter(input, predicate)
}

pub fn create_projection(input: OperatorRef, selector: Expression) -> QueryResult<OperatorRef> {
    project::create_projection(input, selector)
}

pub fn create_sort(input: OperatorRef, keys: Vec<SortKey>, null_ordering: NullOrdering) -> QueryResult<OperatorRef> {
    sort::create_sort(input, keys, null_ordering)
}

pub fn create_skip(input: OperatorRef, count: usize) -> QueryResult<OperatorRef> {
    limit::create_skip(input, count)
}

pub fn create_take(input: OperatorRef, limit: Option<usize>) -> QueryResult<OperatorRef> {
    limit::create_take(input, limit)
}

pub fn create_distinct(input: OperatorRef) -> QueryResult<OperatorRef> {
    distinct::create_distinct(input)
}

#[allow(clippy::too_many_arguments)]
pub fn create_join(
    outer: OperatorRef,
    inner: OperatorRef,
    outer_key: Expression,
    inner_key: Expression,
    mode: JoinMode,
    selector: JoinSelector,
    null_keys: NullKeyPolicy,
) -> QueryResult<OperatorRef> {
    join::create_hash_join(outer, inner, outer_key, inner_key, mode, selector, null_keys)
}
