// Terminal Operators
//
// Terminals end a chain and reduce it to one outcome. They pull lazily and
// stop as soon as the outcome is decided, then close the operator tree.

use std::ops::ControlFlow;

use crate::query::executor::expression_eval::evaluate_predicate;
use crate::query::executor::operators::{Operator, OperatorRef};
use crate::query::executor::result::{DataValue, QueryError, QueryResult};
use crate::query::expression::ast::Expression;
use crate::query::operation::{TerminalKind, TerminalOperation};

/// Result of a terminal operation
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalOutcome {
    /// `single`, `first` and their `_or_default` forms; `None` is the default
    Element(Option<DataValue>),
    /// `any` and `all`
    Boolean(bool),
    Count(usize),
}

/// Pull elements through `visit` until it breaks or the input ends. The
/// tree is always closed, including when init or evaluation fails.
fn pull<F>(input: &OperatorRef, mut visit: F) -> QueryResult<()>
where
    F: FnMut(DataValue) -> QueryResult<ControlFlow<()>>,
{
    let mut op = input.lock();
    let outcome = op.init().and_then(|()| pull_until(&mut *op, &mut visit));
    let closed = op.close();
    outcome.and(closed)
}

fn pull_until<F>(op: &mut dyn Operator, visit: &mut F) -> QueryResult<()>
where
    F: FnMut(DataValue) -> QueryResult<ControlFlow<()>>,
{
    while let Some(element) = op.next()? {
        if visit(element)?.is_break() {
            break;
        }
    }
    Ok(())
}

fn qualifies(predicate: Option<&Expression>, element: &DataValue) -> QueryResult<bool> {
    match predicate {
        Some(p) => Ok(evaluate_predicate(p, element)?.is_true()),
        None => Ok(true),
    }
}

/// Collect at most `limit` qualifying elements
fn take_matches(input: &OperatorRef, predicate: Option<&Expression>, limit: usize) -> QueryResult<Vec<DataValue>> {
    let mut found = Vec::new();
    pull(input, |element| {
        if qualifies(predicate, &element)? {
            found.push(element);
        }
        Ok(if found.len() >= limit { ControlFlow::Break(()) } else { ControlFlow::Continue(()) })
    })?;
    Ok(found)
}

/// The only qualifying element
pub fn single(input: &OperatorRef, predicate: Option<&Expression>) -> QueryResult<DataValue> {
    single_or_default(input, predicate)?.ok_or(QueryError::NoMatch)
}

/// The only qualifying element, or `None` when there is none
pub fn single_or_default(input: &OperatorRef, predicate: Option<&Expression>) -> QueryResult<Option<DataValue>> {
    let mut found = take_matches(input, predicate, 2)?;
    if found.len() > 1 {
        return Err(QueryError::MultipleMatches);
    }
    Ok(found.pop())
}

/// The first qualifying element in pipeline order
pub fn first(input: &OperatorRef, predicate: Option<&Expression>) -> QueryResult<DataValue> {
    first_or_default(input, predicate)?.ok_or(QueryError::NoMatch)
}

pub fn first_or_default(input: &OperatorRef, predicate: Option<&Expression>) -> QueryResult<Option<DataValue>> {
    Ok(take_matches(input, predicate, 1)?.pop())
}

pub fn any(input: &OperatorRef, predicate: Option<&Expression>) -> QueryResult<bool> {
    Ok(!take_matches(input, predicate, 1)?.is_empty())
}

/// True when the predicate is True for every element. Unknown counts as a
/// failure, and an empty input is vacuously true.
pub fn all(input: &OperatorRef, predicate: &Expression) -> QueryResult<bool> {
    let mut holds = true;
    pull(input, |element| {
        if evaluate_predicate(predicate, &element)?.is_true() {
            Ok(ControlFlow::Continue(()))
        } else {
            holds = false;
            Ok(ControlFlow::Break(()))
        }
    })?;
    Ok(holds)
}

pub fn count(input: &OperatorRef, predicate: Option<&Expression>) -> QueryResult<usize> {
    let mut total = 0usize;
    pull(input, |element| {
        if qualifies(predicate, &element)? {
            total += 1;
        }
        Ok(ControlFlow::Continue(()))
    })?;
    Ok(total)
}

/// Dispatch a terminal operation
pub fn run(input: &OperatorRef, terminal: &TerminalOperation) -> QueryResult<TerminalOutcome> {
    let predicate = terminal.predicate.as_ref();
    match terminal.kind {
        TerminalKind::Single => single(input, predicate).map(|e| TerminalOutcome::Element(Some(e))),
        TerminalKind::SingleOrDefault => single_or_default(input, predicate).map(TerminalOutcome::Element),
        TerminalKind::First => first(input, predicate).map(|e| TerminalOutcome::Element(Some(e))),
        TerminalKind::FirstOrDefault => first_or_default(input, predicate).map(TerminalOutcome::Element),
        TerminalKind::Any => any(input, predicate).map(TerminalOutcome::Boolean),
        TerminalKind::All => {
            let predicate = predicate.ok_or_else(|| QueryError::InvalidArgument("all requires a predicate".to_string()))?;
            all(input, predicate).map(TerminalOutcome::Boolean)
        }
        TerminalKind::Count => count(input, predicate).map(TerminalOutcome::Count),
    }
}
