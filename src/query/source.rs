// Query Source
//
// Immutable, cheaply clonable pipeline handles. Every composition method
// returns a new QuerySource that points at its parent; nothing is evaluated
// until the chain is materialized or a terminal runs.

use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::catalog::{RecordSource, Schema};
use crate::common::config::EvaluationConfig;
use crate::query::executor::engine::ExecutionEngine;
use crate::query::executor::operators::OperatorRef;
use crate::query::executor::result::{DataValue, QueryError, QueryResult};
use crate::query::executor::terminal::TerminalOutcome;
use crate::query::expression::ast::Expression;
use crate::query::expression::validation::validate_expression;
use crate::query::operation::{
    JoinMode, JoinSelector, Operation, SortDirection, SortKey, TerminalKind, TerminalOperation,
};

enum NodeKind {
    Root(Arc<dyn RecordSource>),
    Step { parent: QuerySource, operation: Operation },
}

struct QueryNode {
    kind: NodeKind,
    config: EvaluationConfig,
    /// Fields of the current element, when known
    shape: Option<Arc<Schema>>,
}

/// A composable, lazily evaluated query over a record source
#[derive(Clone)]
pub struct QuerySource {
    node: Arc<QueryNode>,
}

impl QuerySource {
    /// Create a root query over a source with the default configuration
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self::with_config(source, EvaluationConfig::default())
    }

    /// Create a root query with an explicit configuration, inherited by
    /// every query derived from it
    pub fn with_config(source: Arc<dyn RecordSource>, config: EvaluationConfig) -> Self {
        let shape = source.schema().cloned().map(Arc::new);
        QuerySource {
            node: Arc::new(QueryNode {
                kind: NodeKind::Root(source),
                config,
                shape,
            }),
        }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.node.config
    }

    /// Fields of the elements this query produces, when known
    pub fn shape(&self) -> Option<&Schema> {
        self.node.shape.as_deref()
    }

    pub fn parent(&self) -> Option<&QuerySource> {
        match &self.node.kind {
            NodeKind::Step { parent, .. } => Some(parent),
            NodeKind::Root(_) => None,
        }
    }

    pub fn operation(&self) -> Option<&Operation> {
        match &self.node.kind {
            NodeKind::Step { operation, .. } => Some(operation),
            NodeKind::Root(_) => None,
        }
    }

    /// The underlying record source; only set on a root
    pub fn record_source(&self) -> Option<&Arc<dyn RecordSource>> {
        match &self.node.kind {
            NodeKind::Root(source) => Some(source),
            NodeKind::Step { .. } => None,
        }
    }

    /// Short chain description such as `products.Filter.OrderBy`
    pub fn describe(&self) -> String {
        match &self.node.kind {
            NodeKind::Root(source) => source.name().to_string(),
            NodeKind::Step { parent, operation } => format!("{}.{}", parent.describe(), operation.name()),
        }
    }

    fn step(&self, operation: Operation, shape: Option<Arc<Schema>>) -> QuerySource {
        QuerySource {
            node: Arc::new(QueryNode {
                kind: NodeKind::Step {
                    parent: self.clone(),
                    operation,
                },
                config: self.node.config,
                shape,
            }),
        }
    }

    fn same_shape(&self) -> Option<Arc<Schema>> {
        self.node.shape.clone()
    }

    // Composition

    /// Keep elements for which `predicate` is True
    pub fn filter(&self, predicate: Expression) -> QueryResult<QuerySource> {
        validate_expression(&predicate, self.shape())?;
        Ok(self.step(Operation::Filter(predicate), self.same_shape()))
    }

    /// Map each element through `selector`
    pub fn project(&self, selector: Expression) -> QueryResult<QuerySource> {
        validate_expression(&selector, self.shape())?;
        let shape = match selector {
            Expression::Current => self.same_shape(),
            _ => None,
        };
        Ok(self.step(Operation::Project(selector), shape))
    }

    pub fn order_by(&self, key: Expression) -> QueryResult<QuerySource> {
        self.sort(key, SortDirection::Ascending, false)
    }

    pub fn order_by_descending(&self, key: Expression) -> QueryResult<QuerySource> {
        self.sort(key, SortDirection::Descending, false)
    }

    /// Add a lower-priority key to the ordering directly before this call
    pub fn then_by(&self, key: Expression) -> QueryResult<QuerySource> {
        self.sort(key, SortDirection::Ascending, true)
    }

    pub fn then_by_descending(&self, key: Expression) -> QueryResult<QuerySource> {
        self.sort(key, SortDirection::Descending, true)
    }

    fn sort(&self, key: Expression, direction: SortDirection, continuation: bool) -> QueryResult<QuerySource> {
        if continuation && !matches!(self.operation(), Some(Operation::Sort { .. })) {
            return Err(QueryError::InvalidArgument(
                "then_by must directly follow order_by or another then_by".to_string(),
            ));
        }
        validate_expression(&key, self.shape())?;
        let operation = Operation::Sort {
            key: SortKey::new(key, direction),
            continuation,
        };
        Ok(self.step(operation, self.same_shape()))
    }

    /// Bypass the first `count` elements; a negative count skips nothing
    pub fn skip(&self, count: i64) -> QuerySource {
        let count = usize::try_from(count.max(0)).unwrap_or(usize::MAX);
        self.step(Operation::Skip(count), self.same_shape())
    }

    /// Keep at most `count` elements; a negative count keeps nothing
    pub fn take(&self, count: i64) -> QuerySource {
        let limit = if count < 0 {
            None
        } else {
            Some(usize::try_from(count).unwrap_or(usize::MAX))
        };
        self.step(Operation::Take(limit), self.same_shape())
    }

    /// Keep the first occurrence of each structurally distinct element
    pub fn distinct(&self) -> QuerySource {
        self.step(Operation::Distinct, self.same_shape())
    }

    /// Pair each element with every element of `inner` whose key is equal.
    ///
    /// The whole join, including the inner chain, is evaluated under this
    /// query's `EvaluationConfig`; the configuration `inner` was created
    /// with is ignored.
    pub fn join(
        &self,
        inner: &QuerySource,
        outer_key: Expression,
        inner_key: Expression,
        selector: JoinSelector,
    ) -> QueryResult<QuerySource> {
        self.join_with_mode(JoinMode::Inner, inner, outer_key, inner_key, selector)
    }

    /// Like `join`, but an element without matches is kept once, paired
    /// with an absent inner value
    pub fn left_join(
        &self,
        inner: &QuerySource,
        outer_key: Expression,
        inner_key: Expression,
        selector: JoinSelector,
    ) -> QueryResult<QuerySource> {
        self.join_with_mode(JoinMode::Left, inner, outer_key, inner_key, selector)
    }

    /// Pair each element with the list of its matches in `inner`
    pub fn group_join(
        &self,
        inner: &QuerySource,
        outer_key: Expression,
        inner_key: Expression,
        selector: JoinSelector,
    ) -> QueryResult<QuerySource> {
        self.join_with_mode(JoinMode::Group, inner, outer_key, inner_key, selector)
    }

    fn join_with_mode(
        &self,
        mode: JoinMode,
        inner: &QuerySource,
        outer_key: Expression,
        inner_key: Expression,
        selector: JoinSelector,
    ) -> QueryResult<QuerySource> {
        if selector.outer.is_empty() || selector.inner.is_empty() || selector.outer == selector.inner {
            return Err(QueryError::InvalidArgument(format!(
                "Join sides need distinct, non-empty names, got '{}' and '{}'",
                selector.outer, selector.inner
            )));
        }
        validate_expression(&outer_key, self.shape())?;
        validate_expression(&inner_key, inner.shape())?;
        if let Some(projection) = &selector.projection {
            validate_expression(projection, None)?;
        }
        let operation = Operation::Join {
            mode,
            inner: inner.clone(),
            outer_key,
            inner_key,
            selector,
        };
        Ok(self.step(operation, None))
    }

    // Materialization

    fn engine(&self) -> ExecutionEngine {
        ExecutionEngine::new(self.node.config)
    }

    /// Evaluate the full chain and collect every element
    pub fn to_list(&self) -> QueryResult<Vec<DataValue>> {
        self.engine().execute(self)
    }

    /// Start a fresh lazy evaluation of the chain
    pub fn iter(&self) -> QueryResult<Rows> {
        let tree = self.engine().build_operator_tree(self)?;
        let initialized = tree.lock().init();
        if let Err(e) = initialized {
            if let Err(close_err) = tree.lock().close() {
                debug!("Closing after failed init failed: {}", close_err);
            }
            return Err(e);
        }
        Ok(Rows { tree, done: false })
    }

    // Terminals

    /// Run a terminal operation after validating its predicate
    pub fn execute(&self, terminal: &TerminalOperation) -> QueryResult<TerminalOutcome> {
        if let Some(predicate) = &terminal.predicate {
            validate_expression(predicate, self.shape())?;
        }
        self.engine().execute_terminal(self, terminal)
    }

    fn element(&self, terminal: TerminalOperation) -> QueryResult<Option<DataValue>> {
        match self.execute(&terminal)? {
            TerminalOutcome::Element(element) => Ok(element),
            other => Err(unexpected(terminal.kind, other)),
        }
    }

    fn boolean(&self, terminal: TerminalOperation) -> QueryResult<bool> {
        match self.execute(&terminal)? {
            TerminalOutcome::Boolean(b) => Ok(b),
            other => Err(unexpected(terminal.kind, other)),
        }
    }

    fn counted(&self, terminal: TerminalOperation) -> QueryResult<usize> {
        match self.execute(&terminal)? {
            TerminalOutcome::Count(n) => Ok(n),
            other => Err(unexpected(terminal.kind, other)),
        }
    }

    /// The only element; `NoMatch` when empty, `MultipleMatches` when more
    pub fn single(&self) -> QueryResult<DataValue> {
        self.element(TerminalOperation::new(TerminalKind::Single))?.ok_or(QueryError::NoMatch)
    }

    pub fn single_where(&self, predicate: Expression) -> QueryResult<DataValue> {
        self.element(TerminalOperation::with_predicate(TerminalKind::Single, predicate))?
            .ok_or(QueryError::NoMatch)
    }

    pub fn single_or_default(&self) -> QueryResult<Option<DataValue>> {
        self.element(TerminalOperation::new(TerminalKind::SingleOrDefault))
    }

    pub fn single_or_default_where(&self, predicate: Expression) -> QueryResult<Option<DataValue>> {
        self.element(TerminalOperation::with_predicate(TerminalKind::SingleOrDefault, predicate))
    }

    pub fn first(&self) -> QueryResult<DataValue> {
        self.element(TerminalOperation::new(TerminalKind::First))?.ok_or(QueryError::NoMatch)
    }

    pub fn first_where(&self, predicate: Expression) -> QueryResult<DataValue> {
        self.element(TerminalOperation::with_predicate(TerminalKind::First, predicate))?
            .ok_or(QueryError::NoMatch)
    }

    pub fn first_or_default(&self) -> QueryResult<Option<DataValue>> {
        self.element(TerminalOperation::new(TerminalKind::FirstOrDefault))
    }

    pub fn first_or_default_where(&self, predicate: Expression) -> QueryResult<Option<DataValue>> {
        self.element(TerminalOperation::with_predicate(TerminalKind::FirstOrDefault, predicate))
    }

    pub fn any(&self) -> QueryResult<bool> {
        self.boolean(TerminalOperation::new(TerminalKind::Any))
    }

    pub fn any_where(&self, predicate: Expression) -> QueryResult<bool> {
        self.boolean(TerminalOperation::with_predicate(TerminalKind::Any, predicate))
    }

    /// True when `predicate` is True for every element
    pub fn all(&self, predicate: Expression) -> QueryResult<bool> {
        self.boolean(TerminalOperation::with_predicate(TerminalKind::All, predicate))
    }

    pub fn count(&self) -> QueryResult<usize> {
        self.counted(TerminalOperation::new(TerminalKind::Count))
    }

    pub fn count_where(&self, predicate: Expression) -> QueryResult<usize> {
        self.counted(TerminalOperation::with_predicate(TerminalKind::Count, predicate))
    }
}

fn unexpected(kind: TerminalKind, outcome: TerminalOutcome) -> QueryError {
    QueryError::ExecutionError(format!("{:?} produced unexpected outcome {:?}", kind, outcome))
}

impl fmt::Debug for QuerySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuerySource({})", self.describe())
    }
}

/// Lazy iterator over one evaluation of a query. Errors end the iteration.
pub struct Rows {
    tree: OperatorRef,
    done: bool,
}

impl Rows {
    fn finish(&mut self) -> QueryResult<()> {
        self.done = true;
        self.tree.lock().close()
    }
}

impl Iterator for Rows {
    type Item = QueryResult<DataValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let next_element = self.tree.lock().next();
        match next_element {
            Ok(Some(element)) => Some(Ok(element)),
            Ok(None) => self.finish().err().map(Err),
            Err(e) => {
                let _ = self.finish();
                Some(Err(e))
            }
        }
    }
}

impl Drop for Rows {
    fn drop(&mut self) {
        if !self.done {
            if let Err(e) = self.finish() {
                debug!("Closing abandoned iteration failed: {}", e);
            }
        }
    }
}
