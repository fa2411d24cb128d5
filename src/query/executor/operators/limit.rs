// Skip and Take Operators
//
// Positional pagination. Take stops pulling from its input once it has
// emitted its limit.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::query::executor::operators::{Operator, OperatorRef};
use crate::query::executor::result::{DataValue, QueryError, QueryResult};

/// Discards the first `count` elements of its input
pub struct SkipOperator {
    input: OperatorRef,
    count: usize,
    skipped: bool,
    initialized: bool,
}

impl SkipOperator {
    pub fn new(input: OperatorRef, count: usize) -> Self {
        SkipOperator {
            input,
            count,
            skipped: false,
            initialized: false,
        }
    }
}

impl Operator for SkipOperator {
    fn init(&mut self) -> QueryResult<()> {
        self.input.lock().init()?;
        self.skipped = false;
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> QueryResult<Option<DataValue>> {
        if !self.initialized {
            return Err(QueryError::ExecutionError("Operator not initialized".to_string()));
        }
        let mut input = self.input.lock();
        if !self.skipped {
            self.skipped = true;
            for _ in 0..self.count {
                if input.next()?.is_none() {
                    return Ok(None);
                }
            }
        }
        input.next()
    }

    fn close(&mut self) -> QueryResult<()> {
        self.initialized = false;
        self.input.lock().close()
    }
}

/// Yields at most `limit` elements of its input; `None` yields nothing
pub struct TakeOperator {
    input: OperatorRef,
    limit: Option<usize>,
    emitted: usize,
    initialized: bool,
}

impl TakeOperator {
    pub fn new(input: OperatorRef, limit: Option<usize>) -> Self {
        TakeOperator {
            input,
            limit,
            emitted: 0,
            initialized: false,
        }
    }
}

impl Operator for TakeOperator {
    fn init(&mut self) -> QueryResult<()> {
        self.input.lock().init()?;
        self.emitted = 0;
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> QueryResult<Option<DataValue>> {
        if !self.initialized {
            return Err(QueryError::ExecutionError("Operator not initialized".to_string()));
        }
        let limit = self.limit.unwrap_or(0);
        if self.emitted >= limit {
            return Ok(None);
        }
        let next_element = self.input.lock().next()?;
        if next_element.is_some() {
            self.emitted += 1;
        }
        Ok(next_element)
    }

    fn close(&mut self) -> QueryResult<()> {
        self.initialized = false;
        self.input.lock().close()
    }
}

pub fn create_skip(input: OperatorRef, count: usize) -> QueryResult<OperatorRef> {
    Ok(Arc::new(Mutex::new(SkipOperator::new(input, count))))
}

pub fn create_take(input: OperatorRef, limit: Option<usize>) -> QueryResult<OperatorRef> {
    Ok(Arc::new(Mutex::new(TakeOperator::new(input, limit))))
}
