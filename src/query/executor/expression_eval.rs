// Expression Evaluation Utility
//
// Evaluates expression trees against a single element. Predicates produce a
// three-valued Truth; selectors produce a DataValue.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::catalog::DataType;
use crate::query::executor::result::{DataValue, QueryError, QueryResult, Record};
use crate::query::executor::truth::Truth;
use crate::query::expression::ast::{BinaryOperator, Expression, FieldPath, UnaryOperator};
use crate::query::expression::coercion;
use crate::query::expression::functions::FUNCTIONS;

/// Evaluate a selector expression against the current element.
pub fn evaluate_expression(expr: &Expression, element: &DataValue) -> QueryResult<DataValue> {
    match expr {
        Expression::Field(path) => resolve_path(path, element),
        Expression::Constant(value) => Ok(value.clone()),
        Expression::Captured { value, .. } => Ok(value.clone()),
        Expression::Current => Ok(element.clone()),
        Expression::Binary { op, left, right } => {
            if !op.is_arithmetic() {
                return Ok(evaluate_predicate(expr, element)?.into());
            }
            let left_val = evaluate_expression(left, element)?;
            let right_val = evaluate_expression(right, element)?;
            evaluate_arithmetic(*op, &left_val, &right_val)
        }
        Expression::Unary { op, operand } => match op {
            UnaryOperator::Not | UnaryOperator::HasValue | UnaryOperator::IsAbsent => {
                Ok(evaluate_predicate(expr, element)?.into())
            }
            UnaryOperator::Negate => {
                let value = evaluate_expression(operand, element)?;
                if value.is_null() {
                    Ok(DataValue::Null)
                } else {
                    coercion::negate(&value)
                }
            }
            UnaryOperator::Cast(target) => {
                let value = evaluate_expression(operand, element)?;
                cast_value(&value, *target)
            }
        },
        Expression::Function { name, args } => {
            let function = FUNCTIONS.resolve(name, args.len())?;
            let values = args
                .iter()
                .map(|arg| evaluate_expression(arg, element))
                .collect::<QueryResult<Vec<_>>>()?;
            function(&values)
        }
        Expression::Construct(members) => {
            let mut record = Record::new();
            for (name, member) in members {
                record.set(name.as_str(), evaluate_expression(member, element)?);
            }
            Ok(DataValue::Record(record))
        }
    }
}

/// Evaluate a predicate against the current element using three-valued logic.
pub fn evaluate_predicate(expr: &Expression, element: &DataValue) -> QueryResult<Truth> {
    match expr {
        Expression::Binary { op, left, right } if op.is_logical() => {
            let left_truth = evaluate_predicate(left, element)?;
            match (op, left_truth) {
                (BinaryOperator::And, Truth::False) => Ok(Truth::False),
                (BinaryOperator::Or, Truth::True) => Ok(Truth::True),
                (BinaryOperator::And, _) => Ok(left_truth.and(evaluate_predicate(right, element)?)),
                _ => Ok(left_truth.or(evaluate_predicate(right, element)?)),
            }
        }
        Expression::Binary { op, left, right } if op.is_comparison() => {
            evaluate_comparison(*op, left, right, element)
        }
        Expression::Unary { op: UnaryOperator::Not, operand } => Ok(!evaluate_predicate(operand, element)?),
        Expression::Unary { op: UnaryOperator::HasValue, operand } => {
            Ok(Truth::from(!evaluate_expression(operand, element)?.is_null()))
        }
        Expression::Unary { op: UnaryOperator::IsAbsent, operand } => {
            Ok(Truth::from(evaluate_expression(operand, element)?.is_null()))
        }
        _ => Truth::from_value(&evaluate_expression(expr, element)?),
    }
}

fn evaluate_comparison(
    op: BinaryOperator,
    left: &Expression,
    right: &Expression,
    element: &DataValue,
) -> QueryResult<Truth> {
    let left_val = evaluate_expression(left, element)?;
    let right_val = evaluate_expression(right, element)?;
    let (left_const, right_const) = (left.is_constant(), right.is_constant());

    // `x = null` and `x != null` are presence tests
    if matches!(op, BinaryOperator::Equal | BinaryOperator::NotEqual) {
        let other = if left_const && left_val.is_null() {
            Some(&right_val)
        } else if right_const && right_val.is_null() {
            Some(&left_val)
        } else {
            None
        };
        if let Some(other) = other {
            let absent = other.is_null();
            return Ok(Truth::from(if op == BinaryOperator::Equal { absent } else { !absent }));
        }
    }

    // `x != v` against a present constant also excludes absent x
    if op == BinaryOperator::NotEqual && (left_const || right_const) {
        if left_val.is_null() || right_val.is_null() {
            return Ok(Truth::False);
        }
        return Ok(Truth::from(!left_val.equals(&right_val)?));
    }

    if left_val.is_null() || right_val.is_null() {
        return Ok(Truth::Unknown);
    }

    let result = match op {
        BinaryOperator::Equal => left_val.equals(&right_val)?,
        BinaryOperator::NotEqual => !left_val.equals(&right_val)?,
        BinaryOperator::LessThan => left_val.compare(&right_val)?.is_lt(),
        BinaryOperator::LessEqual => left_val.compare(&right_val)?.is_le(),
        BinaryOperator::GreaterThan => left_val.compare(&right_val)?.is_gt(),
        BinaryOperator::GreaterEqual => left_val.compare(&right_val)?.is_ge(),
        other => {
            return Err(QueryError::InvalidArgument(format!(
                "{} is not a comparison operator",
                other.symbol()
            )))
        }
    };
    Ok(Truth::from(result))
}

fn evaluate_arithmetic(op: BinaryOperator, left: &DataValue, right: &DataValue) -> QueryResult<DataValue> {
    let is_text = |v: &DataValue| matches!(v, DataValue::Text(_));
    if op == BinaryOperator::Add && (is_text(left) || is_text(right)) {
        return Ok(DataValue::Text(format!("{}{}", left.to_text(), right.to_text())));
    }
    if left.is_null() || right.is_null() {
        return Ok(DataValue::Null);
    }
    coercion::arithmetic(op, left, right)
}

/// Navigate a field path from the element. An absent intermediate value
/// yields absent rather than an error.
fn resolve_path(path: &FieldPath, element: &DataValue) -> QueryResult<DataValue> {
    let mut current = element;
    for segment in path.segments() {
        match current {
            DataValue::Null => return Ok(DataValue::Null),
            DataValue::Record(record) => {
                current = record
                    .get(segment)
                    .ok_or_else(|| QueryError::FieldNotFound(path.to_string()))?;
            }
            other => {
                return Err(QueryError::TypeError(format!(
                    "Cannot access field '{}' on {}",
                    segment,
                    other.type_name()
                )))
            }
        }
    }
    Ok(current.clone())
}

/// Explicit conversion. Absent stays absent.
fn cast_value(value: &DataValue, target: DataType) -> QueryResult<DataValue> {
    if value.is_null() || value.data_type() == Some(target) {
        return Ok(value.clone());
    }

    let numeric_target = coercion::kind_for(target);

    match (value, target) {
        (_, DataType::Text) => Ok(DataValue::Text(value.to_text())),
        (DataValue::Text(s), DataType::Integer) => parse_text(s, target, |t| t.parse::<i64>().ok().map(DataValue::Integer)),
        (DataValue::Text(s), DataType::Decimal) => parse_text(s, target, |t| Decimal::from_str(t).ok().map(DataValue::Decimal)),
        (DataValue::Text(s), DataType::Float) => parse_text(s, target, |t| t.parse::<f64>().ok().map(DataValue::Float)),
        (DataValue::Text(s), DataType::Boolean) => parse_text(s, target, |t| t.parse::<bool>().ok().map(DataValue::Boolean)),
        (DataValue::Text(s), DataType::Date) => parse_text(s, target, |t| {
            NaiveDate::parse_from_str(t, "%Y-%m-%d").ok().map(DataValue::Date)
        }),
        _ => match (coercion::numeric_kind(value), numeric_target) {
            (Some(_), Some(kind)) => Ok(coercion::convert(value, kind)?.into()),
            _ => Err(QueryError::TypeError(format!(
                "Cannot cast {} to {}",
                value.type_name(),
                target
            ))),
        },
    }
}

fn parse_text(
    text: &str,
    target: DataType,
    parse: impl Fn(&str) -> Option<DataValue>,
) -> QueryResult<DataValue> {
    parse(text.trim()).ok_or_else(|| QueryError::TypeError(format!("Cannot cast '{}' to {}", text, target)))
}
