// Three-valued Logic
//
// Predicates evaluate to True, False or Unknown. Unknown arises from
// comparisons against absent values and propagates through NOT, AND and OR
// following the standard relational truth tables.

use std::ops;

use crate::query::executor::result::{DataValue, QueryError, QueryResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Truth {
    True,
    False,
    Unknown,
}

impl Truth {
    /// Only `True` retains an element
    pub fn is_true(self) -> bool {
        self == Truth::True
    }

    /// Three-valued conjunction. `False` dominates `Unknown`.
    pub fn and(self, other: Truth) -> Truth {
        match (self, other) {
            (Truth::False, _) | (_, Truth::False) => Truth::False,
            (Truth::True, Truth::True) => Truth::True,
            _ => Truth::Unknown,
        }
    }

    /// Three-valued disjunction. `True` dominates `Unknown`.
    pub fn or(self, other: Truth) -> Truth {
        match (self, other) {
            (Truth::True, _) | (_, Truth::True) => Truth::True,
            (Truth::False, Truth::False) => Truth::False,
            _ => Truth::Unknown,
        }
    }

    /// Interpret a value as a predicate result. Absent is `Unknown`.
    pub fn from_value(value: &DataValue) -> QueryResult<Truth> {
        match value {
            DataValue::Boolean(b) => Ok(Truth::from(*b)),
            DataValue::Null => Ok(Truth::Unknown),
            other => Err(QueryError::TypeError(format!(
                "Expected a boolean predicate, got {}",
                other.type_name()
            ))),
        }
    }
}

impl ops::Not for Truth {
    type Output = Truth;

    fn not(self) -> Truth {
        match self {
            Truth::True => Truth::False,
            Truth::False => Truth::True,
            Truth::Unknown => Truth::Unknown,
        }
    }
}

impl From<bool> for Truth {
    fn from(value: bool) -> Self {
        if value { Truth::True } else { Truth::False }
    }
}

impl From<Truth> for DataValue {
    fn from(value: Truth) -> Self {
        match value {
            Truth::True => DataValue::Boolean(true),
            Truth::False => DataValue::Boolean(false),
            Truth::Unknown => DataValue::Null,
        }
    }
}
