// Filter Operator Implementation
//
// This module implements the filter operator, which retains an element only
// when its predicate evaluates to True. False and Unknown both drop it.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::query::executor::expression_eval::evaluate_predicate;
use crate::query::executor::operators::{Operator, OperatorRef};
use crate::query::executor::result::{DataValue, QueryError, QueryResult};
use crate::query::expression::ast::Expression;

/// Filter operator that filters elements based on a predicate
pub struct FilterOperator {
    /// The input operator
    input: OperatorRef,
    /// The predicate to evaluate
    predicate: Expression,
    /// Whether the operator is initialized
    initialized: bool,
}

impl FilterOperator {
    /// Create a new filter operator
    pub fn new(input: OperatorRef, predicate: Expression) -> Self {
        FilterOperator {
            input,
            predicate,
            initialized: false,
        }
    }
}

impl Operator for FilterOperator {
    fn init(&mut self) -> QueryResult<()> {
        self.input.lock().init()?;
        self.initialized = true;
        Ok(())
    }

    /// Get the next element that satisfies the predicate
    fn next(&mut self) -> QueryResult<Option<DataValue>> {
        if !self.initialized {
            return Err(QueryError::ExecutionError("Operator not initialized".to_string()));
        }

        loop {
            let next_element = self.input.lock().next()?;
            match next_element {
                None => return Ok(None),
                Some(element) => {
                    if evaluate_predicate(&self.predicate, &element)?.is_true() {
                        return Ok(Some(element));
                    }
                }
            }
        }
    }

    fn close(&mut self) -> QueryResult<()> {
        self.initialized = false;
        self.input.lock().close()
    }
}

/// Create a filter operator
pub fn create_filter(input: OperatorRef, predicate: Expression) -> QueryResult<OperatorRef> {
    let filter = FilterOperator::new(input, predicate);
    Ok(Arc::new(Mutex::new(filter)))
}
