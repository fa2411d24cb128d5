// Sort Operator Implementation
//
// Stable multi-key sort. The whole input is buffered on the first pull, keys
// are evaluated once per element, and the first key or comparison error is
// returned to the caller.

use std::cmp::Ordering;
use std::sync::Arc;

use log::trace;
use parking_lot::Mutex;

use crate::common::config::NullOrdering;
use crate::query::executor::expression_eval::evaluate_expression;
use crate::query::executor::operators::{Operator, OperatorRef};
use crate::query::executor::result::{DataValue, QueryError, QueryResult};
use crate::query::operation::{SortDirection, SortKey};

pub struct SortOperator {
    input: OperatorRef,
    /// Comparator chain, most significant key first
    keys: Vec<SortKey>,
    /// Placement of absent keys under ascending order
    null_ordering: NullOrdering,
    output_iter: Option<std::vec::IntoIter<DataValue>>,
    initialized: bool,
}

impl SortOperator {
    pub fn new(input: OperatorRef, keys: Vec<SortKey>, null_ordering: NullOrdering) -> Self {
        SortOperator {
            input,
            keys,
            null_ordering,
            output_iter: None,
            initialized: false,
        }
    }

    fn sort_input(&self) -> QueryResult<Vec<DataValue>> {
        let mut keyed = Vec::new();
        {
            let mut input = self.input.lock();
            while let Some(element) = input.next()? {
                let key_values = self
                    .keys
                    .iter()
                    .map(|k| evaluate_expression(&k.key, &element))
                    .collect::<QueryResult<Vec<_>>>()?;
                keyed.push((key_values, element));
            }
        }
        trace!("Sorting {} elements on {} keys", keyed.len(), self.keys.len());
        self.check_comparable(&keyed)?;

        let mut failure: Option<QueryError> = None;
        keyed.sort_by(|(a, _), (b, _)| {
            if failure.is_some() {
                return Ordering::Equal;
            }
            match self.compare_keys(a, b) {
                Ok(ord) => ord,
                Err(e) => {
                    failure = Some(e);
                    Ordering::Equal
                }
            }
        });
        if let Some(err) = failure {
            return Err(err);
        }

        Ok(keyed.into_iter().map(|(_, element)| element).collect())
    }

    /// Reject mixed key kinds before sorting, so the comparator never fails
    /// midway through a sort
    fn check_comparable(&self, keyed: &[(Vec<DataValue>, DataValue)]) -> QueryResult<()> {
        for position in 0..self.keys.len() {
            let mut present = keyed.iter().map(|(k, _)| &k[position]).filter(|v| !v.is_null());
            if let Some(first) = present.next() {
                for value in present {
                    first.compare(value)?;
                }
            }
        }
        Ok(())
    }

    fn compare_keys(&self, a: &[DataValue], b: &[DataValue]) -> QueryResult<Ordering> {
        for ((left, right), key) in a.iter().zip(b).zip(&self.keys) {
            let ord = compare_with_nulls(left, right, self.null_ordering)?;
            let ord = match key.direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return Ok(ord);
            }
        }
        Ok(Ordering::Equal)
    }
}

/// Compare two key values, placing absent values per `null_ordering`
pub fn compare_with_nulls(left: &DataValue, right: &DataValue, null_ordering: NullOrdering) -> QueryResult<Ordering> {
    let absent_first = null_ordering == NullOrdering::NullsFirst;
    match (left.is_null(), right.is_null()) {
        (true, true) => Ok(Ordering::Equal),
        (true, false) => Ok(if absent_first { Ordering::Less } else { Ordering::Greater }),
        (false, true) => Ok(if absent_first { Ordering::Greater } else { Ordering::Less }),
        (false, false) => left.compare(right),
    }
}

impl Operator for SortOperator {
    fn init(&mut self) -> QueryResult<()> {
        self.input.lock().init()?;
        self.output_iter = None;
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> QueryResult<Option<DataValue>> {
        if !self.initialized {
            return Err(QueryError::ExecutionError("Operator not initialized".to_string()));
        }
        if self.output_iter.is_none() {
            let sorted = self.sort_input()?;
            self.output_iter = Some(sorted.into_iter());
        }
        Ok(self.output_iter.as_mut().and_then(|iter| iter.next()))
    }

    fn close(&mut self) -> QueryResult<()> {
        self.output_iter = None;
        self.initialized = false;
        self.input.lock().close()
    }
}

pub fn create_sort(input: OperatorRef, keys: Vec<SortKey>, null_ordering: NullOrdering) -> QueryResult<OperatorRef> {
    let op = SortOperator::new(input, keys, null_ordering);
    Ok(Arc::new(Mutex::new(op)))
}
