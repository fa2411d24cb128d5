// Hash Join Implementation
//
// Builds a hash table over the inner input keyed by the inner key, then probes
// it with each outer element in order. Results come out in outer order, then
// inner order within a group.

use std::collections::{HashMap, VecDeque};

use log::trace;

use crate::common::config::NullKeyPolicy;
use crate::query::executor::expression_eval::evaluate_expression;
use crate::query::executor::operators::{Operator, OperatorRef};
use crate::query::executor::result::{DataValue, QueryError, QueryResult, Record};
use crate::query::expression::ast::Expression;
use crate::query::operation::{JoinMode, JoinSelector};

/// Hash Join operator implementation
pub struct HashJoin {
    /// Outer input operator (probe side, drives output order)
    outer: OperatorRef,
    /// Inner input operator (build side)
    inner: OperatorRef,
    /// Key evaluated against outer elements
    outer_key: Expression,
    /// Key evaluated against inner elements
    inner_key: Expression,
    mode: JoinMode,
    selector: JoinSelector,
    null_keys: NullKeyPolicy,
    /// Inner elements grouped by key, each group in inner order
    hash_table: HashMap<DataValue, Vec<DataValue>>,
    /// Indicates if the hash table has been built
    hash_table_built: bool,
    /// Results produced for the current outer element
    pending: VecDeque<DataValue>,
    /// Initialization status
    initialized: bool,
}

impl HashJoin {
    /// Create a new hash join operator
    pub fn new(
        outer: OperatorRef,
        inner: OperatorRef,
        outer_key: Expression,
        inner_key: Expression,
        mode: JoinMode,
        selector: JoinSelector,
        null_keys: NullKeyPolicy,
    ) -> Self {
        HashJoin {
            outer,
            inner,
            outer_key,
            inner_key,
            mode,
            selector,
            null_keys,
            hash_table: HashMap::new(),
            hash_table_built: false,
            pending: VecDeque::new(),
            initialized: false,
        }
    }

    fn key_can_match(&self, key: &DataValue) -> bool {
        !(key.is_null() && self.null_keys == NullKeyPolicy::NeverMatch)
    }

    /// Build the hash table from the inner input
    fn build_hash_table(&mut self) -> QueryResult<()> {
        let mut inner = self.inner.lock();
        let mut count = 0usize;
        while let Some(element) = inner.next()? {
            count += 1;
            let key = evaluate_expression(&self.inner_key, &element)?;
            if !self.key_can_match(&key) {
                continue;
            }
            self.hash_table.entry(key).or_default().push(element);
        }
        trace!("Hash join built {} groups from {} inner elements", self.hash_table.len(), count);
        self.hash_table_built = true;
        Ok(())
    }

    /// Shape one result from an outer element and its inner side
    fn emit(&self, outer: &DataValue, inner: DataValue) -> QueryResult<DataValue> {
        let pair = DataValue::Record(
            Record::new()
                .with(self.selector.outer.as_str(), outer.clone())
                .with(self.selector.inner.as_str(), inner),
        );
        match &self.selector.projection {
            Some(projection) => evaluate_expression(projection, &pair),
            None => Ok(pair),
        }
    }

    /// Queue the results for one outer element
    fn probe(&mut self, outer: DataValue) -> QueryResult<()> {
        let key = evaluate_expression(&self.outer_key, &outer)?;
        let matches: &[DataValue] = if self.key_can_match(&key) {
            self.hash_table.get(&key).map(Vec::as_slice).unwrap_or(&[])
        } else {
            &[]
        };

        let results = match self.mode {
            JoinMode::Inner => matches
                .iter()
                .map(|m| self.emit(&outer, m.clone()))
                .collect::<QueryResult<Vec<_>>>()?,
            JoinMode::Left if matches.is_empty() => vec![self.emit(&outer, DataValue::Null)?],
            JoinMode::Left => matches
                .iter()
                .map(|m| self.emit(&outer, m.clone()))
                .collect::<QueryResult<Vec<_>>>()?,
            JoinMode::Group => vec![self.emit(&outer, DataValue::List(matches.to_vec()))?],
        };
        self.pending.extend(results);
        Ok(())
    }
}

impl Operator for HashJoin {
    fn init(&mut self) -> QueryResult<()> {
        self.outer.lock().init()?;
        self.inner.lock().init()?;
        self.hash_table.clear();
        self.hash_table_built = false;
        self.pending.clear();
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> QueryResult<Option<DataValue>> {
        if !self.initialized {
            return Err(QueryError::ExecutionError("Operator not initialized".to_string()));
        }
        if !self.hash_table_built {
            self.build_hash_table()?;
        }

        loop {
            if let Some(result) = self.pending.pop_front() {
                return Ok(Some(result));
            }
            let next_outer = self.outer.lock().next()?;
            match next_outer {
                Some(outer) => self.probe(outer)?,
                None => return Ok(None),
            }
        }
    }

    fn close(&mut self) -> QueryResult<()> {
        self.hash_table.clear();
        self.pending.clear();
        self.initialized = false;
        self.outer.lock().close()?;
        self.inner.lock().close()
    }
}
