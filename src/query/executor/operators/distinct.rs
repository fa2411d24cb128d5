// Distinct Operator
//
// Keeps the first occurrence of each element under structural equality.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::query::executor::operators::{Operator, OperatorRef};
use crate::query::executor::result::{DataValue, QueryError, QueryResult};

pub struct DistinctOperator {
    input: OperatorRef,
    /// Elements already emitted
    seen: HashSet<DataValue>,
    initialized: bool,
}

impl DistinctOperator {
    pub fn new(input: OperatorRef) -> Self {
        DistinctOperator {
            input,
            seen: HashSet::new(),
            initialized: false,
        }
    }
}

impl Operator for DistinctOperator {
    fn init(&mut self) -> QueryResult<()> {
        self.input.lock().init()?;
        self.seen.clear();
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> QueryResult<Option<DataValue>> {
        if !self.initialized {
            return Err(QueryError::ExecutionError("Operator not initialized".to_string()));
        }
        let mut input = self.input.lock();
        while let Some(element) = input.next()? {
            if !self.seen.contains(&element) {
                self.seen.insert(element.clone());
                return Ok(Some(element));
            }
        }
        Ok(None)
    }

    fn close(&mut self) -> QueryResult<()> {
        self.seen.clear();
        self.initialized = false;
        self.input.lock().close()
    }
}

pub fn create_distinct(input: OperatorRef) -> QueryResult<OperatorRef> {
    Ok(Arc::new(Mutex::new(DistinctOperator::new(input))))
}
