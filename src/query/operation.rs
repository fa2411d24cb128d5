// Query Operations
//
// The operations a QuerySource step can apply to its parent, and the
// terminal operations that end a chain.

use std::fmt;

use crate::query::expression::ast::Expression;
use crate::query::source::QuerySource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One key of a multi-key ordering
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub key: Expression,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(key: Expression, direction: SortDirection) -> Self {
        SortKey { key, direction }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinMode {
    /// Only outer elements with at least one match
    Inner,
    /// Every outer element; an empty group pairs with an absent inner value
    Left,
    /// Every outer element paired with the list of its matches
    Group,
}

/// Shapes each join result. The pair record has the outer element under
/// `outer` and the inner side under `inner`; `projection`, when present, is
/// evaluated against that pair record.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSelector {
    pub outer: String,
    pub inner: String,
    pub projection: Option<Expression>,
}

impl JoinSelector {
    pub fn new(outer: &str, inner: &str) -> Self {
        JoinSelector {
            outer: outer.to_string(),
            inner: inner.to_string(),
            projection: None,
        }
    }

    /// Project each pair record through `selector`
    pub fn with_projection(mut self, selector: Expression) -> Self {
        self.projection = Some(selector);
        self
    }
}

/// Operation applied by a QuerySource step, evaluated in composition order
#[derive(Clone)]
pub enum Operation {
    Filter(Expression),
    Project(Expression),
    /// `continuation` is true for `then_by` keys, which extend the
    /// preceding ordering instead of replacing it
    Sort { key: SortKey, continuation: bool },
    Skip(usize),
    /// `None` for a negative count, which yields nothing
    Take(Option<usize>),
    Distinct,
    Join {
        mode: JoinMode,
        inner: QuerySource,
        outer_key: Expression,
        inner_key: Expression,
        selector: JoinSelector,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Filter(_) => "Filter",
            Operation::Project(_) => "Project",
            Operation::Sort { continuation: false, .. } => "OrderBy",
            Operation::Sort { continuation: true, .. } => "ThenBy",
            Operation::Skip(_) => "Skip",
            Operation::Take(_) => "Take",
            Operation::Distinct => "Distinct",
            Operation::Join { mode: JoinMode::Inner, .. } => "Join",
            Operation::Join { mode: JoinMode::Left, .. } => "LeftJoin",
            Operation::Join { mode: JoinMode::Group, .. } => "GroupJoin",
        }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Filter(predicate) => write!(f, "Filter({})", predicate),
            Operation::Project(selector) => write!(f, "Project({})", selector),
            Operation::Sort { key, .. } => write!(f, "{}({}, {:?})", self.name(), key.key, key.direction),
            Operation::Skip(n) => write!(f, "Skip({})", n),
            Operation::Take(Some(n)) => write!(f, "Take({})", n),
            Operation::Take(None) => write!(f, "Take(none)"),
            Operation::Distinct => write!(f, "Distinct"),
            Operation::Join { inner, outer_key, inner_key, .. } => {
                write!(f, "{}({}, {} = {})", self.name(), inner.describe(), outer_key, inner_key)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalKind {
    Single,
    SingleOrDefault,
    First,
    FirstOrDefault,
    Any,
    All,
    Count,
}

/// An operation that ends a chain and produces a single outcome
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalOperation {
    pub kind: TerminalKind,
    pub predicate: Option<Expression>,
}

impl TerminalOperation {
    pub fn new(kind: TerminalKind) -> Self {
        TerminalOperation { kind, predicate: None }
    }

    pub fn with_predicate(kind: TerminalKind, predicate: Expression) -> Self {
        TerminalOperation {
            kind,
            predicate: Some(predicate),
        }
    }
}
