// Projection Operator Implementation
//
// This module implements the projection operator, which maps each element
// through a selector expression.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::query::executor::expression_eval::evaluate_expression;
use crate::query::executor::operators::{Operator, OperatorRef};
use crate::query::executor::result::{DataValue, QueryError, QueryResult};
use crate::query::expression::ast::Expression;

/// Projection operator that evaluates a selector against every input element
pub struct ProjectionOperator {
    /// The input operator
    input: OperatorRef,
    /// The selector to evaluate
    selector: Expression,
    /// Whether the operator is initialized
    initialized: bool,
}

impl ProjectionOperator {
    /// Create a new projection operator
    pub fn new(input: OperatorRef, selector: Expression) -> Self {
        ProjectionOperator {
            input,
            selector,
            initialized: false,
        }
    }
}

impl Operator for ProjectionOperator {
    fn init(&mut self) -> QueryResult<()> {
        self.input.lock().init()?;
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> QueryResult<Option<DataValue>> {
        if !self.initialized {
            return Err(QueryError::ExecutionError("Operator not initialized".to_string()));
        }

        let next_element = self.input.lock().next()?;
        match next_element {
            Some(element) => Ok(Some(evaluate_expression(&self.selector, &element)?)),
            None => Ok(None),
        }
    }

    fn close(&mut self) -> QueryResult<()> {
        self.initialized = false;
        self.input.lock().close()
    }
}

/// Create a projection operator
pub fn create_projection(input: OperatorRef, selector: Expression) -> QueryResult<OperatorRef> {
    let projection = ProjectionOperator::new(input, selector);
    Ok(Arc::new(Mutex::new(projection)))
}
