// Numeric Coercion
//
// Mixed-kind arithmetic and comparison consult a single promotion table
// instead of relying on implicit widening.
//
//   left \ right | Integer  Decimal  Float
//   -------------+-------------------------
//   Integer      | Integer  Decimal  Float
//   Decimal      | Decimal  Decimal  Float
//   Float        | Float    Float    Float

use std::cmp::Ordering;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use crate::catalog::DataType;
use crate::query::executor::result::{DataValue, QueryError, QueryResult};
use crate::query::expression::ast::BinaryOperator;

/// Numeric kinds in rank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NumericKind {
    Integer = 0,
    Decimal = 1,
    Float = 2,
}

const PROMOTION: [[NumericKind; 3]; 3] = [
    [NumericKind::Integer, NumericKind::Decimal, NumericKind::Float],
    [NumericKind::Decimal, NumericKind::Decimal, NumericKind::Float],
    [NumericKind::Float, NumericKind::Float, NumericKind::Float],
];

/// A numeric operand after widening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Integer(i64),
    Decimal(Decimal),
    Float(f64),
}

impl From<Numeric> for DataValue {
    fn from(value: Numeric) -> Self {
        match value {
            Numeric::Integer(i) => DataValue::Integer(i),
            Numeric::Decimal(d) => DataValue::Decimal(d),
            Numeric::Float(f) => DataValue::Float(f),
        }
    }
}

pub fn numeric_kind(value: &DataValue) -> Option<NumericKind> {
    match value {
        DataValue::Integer(_) => Some(NumericKind::Integer),
        DataValue::Decimal(_) => Some(NumericKind::Decimal),
        DataValue::Float(_) => Some(NumericKind::Float),
        _ => None,
    }
}

/// Numeric kind stored by a field of `data_type`, if it is numeric
pub fn kind_for(data_type: DataType) -> Option<NumericKind> {
    match data_type {
        DataType::Integer => Some(NumericKind::Integer),
        DataType::Decimal => Some(NumericKind::Decimal),
        DataType::Float => Some(NumericKind::Float),
        _ => None,
    }
}

/// Look up the common kind two numeric operands are widened to.
pub fn promote(left: NumericKind, right: NumericKind) -> NumericKind {
    PROMOTION[left as usize][right as usize]
}

/// Convert a numeric value to `target`.
///
/// Widening is exact apart from `Decimal -> Float`. Narrowing (used by casts)
/// truncates toward zero and fails with `NumericOverflow` when out of range.
pub fn convert(value: &DataValue, target: NumericKind) -> QueryResult<Numeric> {
    let converted = match (value, target) {
        (DataValue::Integer(i), NumericKind::Integer) => Some(Numeric::Integer(*i)),
        (DataValue::Integer(i), NumericKind::Decimal) => Some(Numeric::Decimal(Decimal::from(*i))),
        (DataValue::Integer(i), NumericKind::Float) => Some(Numeric::Float(*i as f64)),
        (DataValue::Decimal(d), NumericKind::Integer) => d.trunc().to_i64().map(Numeric::Integer),
        (DataValue::Decimal(d), NumericKind::Decimal) => Some(Numeric::Decimal(*d)),
        (DataValue::Decimal(d), NumericKind::Float) => d.to_f64().map(Numeric::Float),
        (DataValue::Float(f), NumericKind::Integer) => {
            let truncated = f.trunc();
            if truncated.is_finite() && truncated >= i64::MIN as f64 && truncated <= i64::MAX as f64 {
                Some(Numeric::Integer(truncated as i64))
            } else {
                None
            }
        }
        (DataValue::Float(f), NumericKind::Decimal) => Decimal::from_f64(*f).map(Numeric::Decimal),
        (DataValue::Float(f), NumericKind::Float) => Some(Numeric::Float(*f)),
        (other, _) => {
            return Err(QueryError::TypeError(format!(
                "Expected a numeric value, got {}",
                other.type_name()
            )))
        }
    };
    converted.ok_or(QueryError::NumericOverflow)
}

/// Widen both operands to their common kind. Returns `None` when either
/// operand is not numeric.
pub fn widen_pair(left: &DataValue, right: &DataValue) -> QueryResult<Option<(Numeric, Numeric)>> {
    let (Some(lk), Some(rk)) = (numeric_kind(left), numeric_kind(right)) else {
        return Ok(None);
    };
    let kind = promote(lk, rk);
    Ok(Some((convert(left, kind)?, convert(right, kind)?)))
}

/// Compare two numeric values after promotion. `Ok(None)` means the operands
/// are not both numeric.
pub fn compare_numeric(left: &DataValue, right: &DataValue) -> QueryResult<Option<Ordering>> {
    let Some(pair) = widen_pair(left, right)? else {
        return Ok(None);
    };
    let ordering = match pair {
        (Numeric::Integer(l), Numeric::Integer(r)) => Some(l.cmp(&r)),
        (Numeric::Decimal(l), Numeric::Decimal(r)) => Some(l.cmp(&r)),
        (Numeric::Float(l), Numeric::Float(r)) => l.partial_cmp(&r),
        _ => None,
    };
    match ordering {
        Some(ord) => Ok(Some(ord)),
        None => Err(QueryError::TypeError(format!(
            "Cannot order {} and {}",
            left, right
        ))),
    }
}

/// Apply an arithmetic operator to two present numeric values.
pub fn arithmetic(op: BinaryOperator, left: &DataValue, right: &DataValue) -> QueryResult<DataValue> {
    let Some(pair) = widen_pair(left, right)? else {
        return Err(QueryError::TypeError(format!(
            "Unsupported types for {} operator: {} and {}",
            op.symbol(),
            left.type_name(),
            right.type_name()
        )));
    };

    let result = match pair {
        (Numeric::Integer(l), Numeric::Integer(r)) => {
            let value = match op {
                BinaryOperator::Add => l.checked_add(r),
                BinaryOperator::Subtract => l.checked_sub(r),
                BinaryOperator::Multiply => l.checked_mul(r),
                BinaryOperator::Divide | BinaryOperator::Remainder if r == 0 => {
                    return Err(QueryError::DivisionByZero)
                }
                // Integer division truncates
                BinaryOperator::Divide => l.checked_div(r),
                BinaryOperator::Remainder => l.checked_rem(r),
                _ => return Err(not_arithmetic(op)),
            };
            Numeric::Integer(value.ok_or(QueryError::NumericOverflow)?)
        }
        (Numeric::Decimal(l), Numeric::Decimal(r)) => {
            let value = match op {
                BinaryOperator::Add => l.checked_add(r),
                BinaryOperator::Subtract => l.checked_sub(r),
                BinaryOperator::Multiply => l.checked_mul(r),
                BinaryOperator::Divide | BinaryOperator::Remainder if r.is_zero() => {
                    return Err(QueryError::DivisionByZero)
                }
                BinaryOperator::Divide => l.checked_div(r),
                BinaryOperator::Remainder => l.checked_rem(r),
                _ => return Err(not_arithmetic(op)),
            };
            Numeric::Decimal(value.ok_or(QueryError::NumericOverflow)?)
        }
        (Numeric::Float(l), Numeric::Float(r)) => {
            let value = match op {
                BinaryOperator::Add => l + r,
                BinaryOperator::Subtract => l - r,
                BinaryOperator::Multiply => l * r,
                BinaryOperator::Divide | BinaryOperator::Remainder if r == 0.0 => {
                    return Err(QueryError::DivisionByZero)
                }
                BinaryOperator::Divide => l / r,
                BinaryOperator::Remainder => l % r,
                _ => return Err(not_arithmetic(op)),
            };
            Numeric::Float(value)
        }
        _ => return Err(QueryError::TypeError("Numeric promotion produced mixed kinds".to_string())),
    };
    Ok(result.into())
}

/// Negate a present numeric value.
pub fn negate(value: &DataValue) -> QueryResult<DataValue> {
    match value {
        DataValue::Integer(i) => i.checked_neg().map(DataValue::Integer).ok_or(QueryError::NumericOverflow),
        DataValue::Decimal(d) => Ok(DataValue::Decimal(-*d)),
        DataValue::Float(f) => Ok(DataValue::Float(-f)),
        other => Err(QueryError::TypeError(format!(
            "Unary minus not supported for type {}",
            other.type_name()
        ))),
    }
}

fn not_arithmetic(op: BinaryOperator) -> QueryError {
    QueryError::InvalidArgument(format!("{} is not an arithmetic operator", op.symbol()))
}
