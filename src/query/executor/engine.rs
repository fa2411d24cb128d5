// Query Execution Engine Implementation
//
// This module turns a QuerySource chain into a fresh pull-based operator tree.
// Nothing is cached between materializations: every call rebuilds the tree
// and re-reads the underlying sources.

use log::{debug, trace};

use crate::common::config::EvaluationConfig;
use crate::query::executor::operators::{
    create_distinct, create_filter, create_join, create_projection, create_scan, create_skip, create_sort,
    create_take, OperatorRef,
};
use crate::query::executor::result::{DataValue, QueryError, QueryResult};
use crate::query::executor::terminal::{self, TerminalOutcome};
use crate::query::operation::{Operation, SortKey, TerminalOperation};
use crate::query::source::QuerySource;

/// Builds and drives operator trees for query sources
pub struct ExecutionEngine {
    config: EvaluationConfig,
}

impl ExecutionEngine {
    pub fn new(config: EvaluationConfig) -> Self {
        ExecutionEngine { config }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Build an operator tree for the chain ending at `source`
    pub fn build_operator_tree(&self, source: &QuerySource) -> QueryResult<OperatorRef> {
        // Collect steps leaf-first, then build root-first
        let mut steps = Vec::new();
        let mut node = source;
        while let (Some(parent), Some(operation)) = (node.parent(), node.operation()) {
            steps.push(operation);
            node = parent;
        }
        let record_source = node
            .record_source()
            .ok_or_else(|| QueryError::ExecutionError("Query chain has no root source".to_string()))?;

        let mut current = create_scan(record_source.clone())?;
        let mut pending_sort: Vec<SortKey> = Vec::new();

        for operation in steps.into_iter().rev() {
            trace!("Adding {:?} operator", operation);
            if let Operation::Sort { key, continuation } = operation {
                if !*continuation {
                    current = self.flush_sort(current, &mut pending_sort)?;
                }
                pending_sort.push(key.clone());
                continue;
            }
            current = self.flush_sort(current, &mut pending_sort)?;

            current = match operation {
                Operation::Filter(predicate) => create_filter(current, predicate.clone())?,
                Operation::Project(selector) => create_projection(current, selector.clone())?,
                Operation::Skip(count) => create_skip(current, *count)?,
                Operation::Take(limit) => create_take(current, *limit)?,
                Operation::Distinct => create_distinct(current)?,
                Operation::Join {
                    mode,
                    inner,
                    outer_key,
                    inner_key,
                    selector,
                } => {
                    // The inner chain runs under this engine's configuration,
                    // not the one its own root was created with
                    let inner_op = self.build_operator_tree(inner)?;
                    create_join(
                        current,
                        inner_op,
                        outer_key.clone(),
                        inner_key.clone(),
                        *mode,
                        selector.clone(),
                        self.config.null_join_keys,
                    )?
                }
                Operation::Sort { .. } => current,
            };
        }

        let tree = self.flush_sort(current, &mut pending_sort)?;
        debug!("Built operator tree for {}", source.describe());
        Ok(tree)
    }

    /// Close off a pending comparator chain as one sort operator
    fn flush_sort(&self, input: OperatorRef, pending: &mut Vec<SortKey>) -> QueryResult<OperatorRef> {
        if pending.is_empty() {
            return Ok(input);
        }
        let keys = std::mem::take(pending);
        create_sort(input, keys, self.config.null_ordering)
    }

    /// Build, initialize and drain the tree for `source`
    pub fn execute(&self, source: &QuerySource) -> QueryResult<Vec<DataValue>> {
        let tree = self.build_operator_tree(source)?;
        let mut root = tree.lock();
        let mut results = Vec::new();
        // Close runs even when init fails part way through the tree
        let drained = root.init().and_then(|()| loop {
            match root.next() {
                Ok(Some(element)) => results.push(element),
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }
        });
        let closed = root.close();
        drained.and(closed)?;
        Ok(results)
    }

    /// Run a terminal operation over `source`
    pub fn execute_terminal(&self, source: &QuerySource, terminal: &TerminalOperation) -> QueryResult<TerminalOutcome> {
        let tree = self.build_operator_tree(source)?;
        let outcome = terminal::run(&tree, terminal);
        if let Err(e) = &outcome {
            debug!("{:?} over {} failed: {}", terminal.kind, source.describe(), e);
        }
        outcome
    }
}

impl Default for ExecutionEngine {
    fn default() -> Self {
        Self::new(EvaluationConfig::default())
    }
}
