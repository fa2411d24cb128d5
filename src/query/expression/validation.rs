// Construction-time Expression Validation
//
// Checks run when an operator is appended to a pipeline, before any element
// is evaluated.

use std::collections::HashSet;

use crate::catalog::Schema;
use crate::query::executor::result::{QueryError, QueryResult};
use crate::query::expression::ast::Expression;
use crate::query::expression::functions::FUNCTIONS;

/// Validate an expression against the function registry and, when the shape
/// of the current element is known, against its fields.
pub fn validate_expression(expr: &Expression, shape: Option<&Schema>) -> QueryResult<()> {
    match expr {
        Expression::Field(path) => {
            let root = path
                .root()
                .filter(|name| !name.is_empty())
                .ok_or_else(|| QueryError::InvalidArgument("Empty field path".to_string()))?;
            if path.segments().iter().any(String::is_empty) {
                return Err(QueryError::InvalidArgument(format!("Malformed field path '{}'", path)));
            }
            if let Some(schema) = shape {
                if !schema.has_field(root) {
                    return Err(QueryError::InvalidArgument(format!(
                        "Unknown field '{}' for source '{}'",
                        root,
                        schema.name()
                    )));
                }
            }
            Ok(())
        }
        Expression::Constant(_) | Expression::Captured { .. } | Expression::Current => Ok(()),
        Expression::Binary { left, right, .. } => {
            validate_expression(left, shape)?;
            validate_expression(right, shape)
        }
        Expression::Unary { operand, .. } => validate_expression(operand, shape),
        Expression::Function { name, args } => {
            FUNCTIONS.resolve(name, args.len())?;
            args.iter().try_for_each(|arg| validate_expression(arg, shape))
        }
        Expression::Construct(members) => {
            let mut seen = HashSet::new();
            for (name, member) in members {
                if name.is_empty() {
                    return Err(QueryError::InvalidArgument("Composite member without a name".to_string()));
                }
                if !seen.insert(name.as_str()) {
                    return Err(QueryError::InvalidArgument(format!(
                        "Duplicate composite member '{}'",
                        name
                    )));
                }
                validate_expression(member, shape)?;
            }
            Ok(())
        }
    }
}
