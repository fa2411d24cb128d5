// Query Expression Module
//
// Expression trees, the function registry, numeric coercion rules and
// construction-time validation.

pub mod ast;
pub mod coercion;
pub mod functions;
pub mod validation;

pub use self::ast::{
    call, captured, construct, current, field, lit, null, BinaryOperator, Expression, FieldPath,
    UnaryOperator,
};
pub use self::functions::{Arity, FunctionRegistry, FUNCTIONS};
pub use self::validation::validate_expression;
