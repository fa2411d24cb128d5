// Query Expression Model
//
// This module defines the expression tree used for predicates, selectors,
// sort keys and join keys.

use std::fmt;
use std::ops;

use crate::catalog::DataType;
use crate::query::executor::result::DataValue;

/// Path of field names navigated from the current element, e.g. `Order.ShipVia`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn new(segments: Vec<String>) -> Self {
        FieldPath { segments }
    }

    /// Parse a dotted path
    pub fn parse(path: &str) -> Self {
        FieldPath {
            segments: path.split('.').map(str::to_string).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// First segment, resolved against the element itself
    pub fn root(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Expression tree node
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Field access on the current element
    Field(FieldPath),
    /// Literal value written into the query
    Constant(DataValue),
    /// Host value captured when the pipeline was built
    Captured { name: String, value: DataValue },
    /// Binary operation (e.g., a + b, x = y)
    Binary {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
    /// Call into the function registry
    Function { name: String, args: Vec<Expression> },
    /// Composite output value with named members
    Construct(Vec<(String, Expression)>),
    /// The current element itself
    Current,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    // Comparison
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    // Logical
    And,
    Or,
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
}

impl BinaryOperator {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOperator::Equal
                | BinaryOperator::NotEqual
                | BinaryOperator::LessThan
                | BinaryOperator::LessEqual
                | BinaryOperator::GreaterThan
                | BinaryOperator::GreaterEqual
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }

    pub fn is_arithmetic(self) -> bool {
        !self.is_comparison() && !self.is_logical()
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Equal => "=",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Remainder => "%",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnaryOperator {
    /// Three-valued negation
    Not,
    /// Arithmetic negation
    Negate,
    /// Two-valued presence test
    HasValue,
    /// Two-valued absence test
    IsAbsent,
    /// Explicit conversion
    Cast(DataType),
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Field(path) => write!(f, "{}", path),
            Expression::Constant(value) => write!(f, "{}", value),
            Expression::Captured { name, .. } => write!(f, "@{}", name),
            Expression::Binary { op, left, right } => write!(f, "({} {} {})", left, op.symbol(), right),
            Expression::Unary { op, operand } => match op {
                UnaryOperator::Not => write!(f, "NOT {}", operand),
                UnaryOperator::Negate => write!(f, "-{}", operand),
                UnaryOperator::HasValue => write!(f, "{} IS NOT NULL", operand),
                UnaryOperator::IsAbsent => write!(f, "{} IS NULL", operand),
                UnaryOperator::Cast(target) => write!(f, "CAST({} AS {})", operand, target),
            },
            Expression::Function { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expression::Construct(members) => {
                write!(f, "{{ ")?;
                for (i, (name, expr)) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, expr)?;
                }
                write!(f, " }}")
            }
            Expression::Current => write!(f, "it"),
        }
    }
}

/// Field access by dotted path
pub fn field(path: &str) -> Expression {
    Expression::Field(FieldPath::parse(path))
}

/// Literal constant
pub fn lit(value: impl Into<DataValue>) -> Expression {
    Expression::Constant(value.into())
}

/// The explicit absent-value literal
pub fn null() -> Expression {
    Expression::Constant(DataValue::Null)
}

/// Capture a host value. The value is snapshotted here, so later changes to
/// the host variable do not affect pipelines already built.
pub fn captured(name: &str, value: impl Into<DataValue>) -> Expression {
    Expression::Captured {
        name: name.to_string(),
        value: value.into(),
    }
}

pub fn call(name: &str, args: Vec<Expression>) -> Expression {
    Expression::Function {
        name: name.to_string(),
        args,
    }
}

/// Build a composite value from `(member name, expression)` pairs
pub fn construct<S: Into<String>>(members: Vec<(S, Expression)>) -> Expression {
    Expression::Construct(members.into_iter().map(|(name, expr)| (name.into(), expr)).collect())
}

pub fn current() -> Expression {
    Expression::Current
}

impl Expression {
    fn binary(self, op: BinaryOperator, right: Expression) -> Expression {
        Expression::Binary {
            op,
            left: Box::new(self),
            right: Box::new(right),
        }
    }

    fn unary(self, op: UnaryOperator) -> Expression {
        Expression::Unary {
            op,
            operand: Box::new(self),
        }
    }

    pub fn equals(self, right: Expression) -> Expression {
        self.binary(BinaryOperator::Equal, right)
    }

    pub fn not_equals(self, right: Expression) -> Expression {
        self.binary(BinaryOperator::NotEqual, right)
    }

    pub fn lt(self, right: Expression) -> Expression {
        self.binary(BinaryOperator::LessThan, right)
    }

    pub fn le(self, right: Expression) -> Expression {
        self.binary(BinaryOperator::LessEqual, right)
    }

    pub fn gt(self, right: Expression) -> Expression {
        self.binary(BinaryOperator::GreaterThan, right)
    }

    pub fn ge(self, right: Expression) -> Expression {
        self.binary(BinaryOperator::GreaterEqual, right)
    }

    pub fn and(self, right: Expression) -> Expression {
        self.binary(BinaryOperator::And, right)
    }

    pub fn or(self, right: Expression) -> Expression {
        self.binary(BinaryOperator::Or, right)
    }

    pub fn has_value(self) -> Expression {
        self.unary(UnaryOperator::HasValue)
    }

    pub fn is_absent(self) -> Expression {
        self.unary(UnaryOperator::IsAbsent)
    }

    pub fn cast(self, target: DataType) -> Expression {
        self.unary(UnaryOperator::Cast(target))
    }

    /// Method-call style function invocation with `self` as the first argument
    pub fn call(self, name: &str, mut args: Vec<Expression>) -> Expression {
        args.insert(0, self);
        call(name, args)
    }

    /// True when the expression never reads the current element: literals,
    /// captured values, and operators or functions over them. Such operands
    /// get the literal rules for `=` and `!=`.
    pub fn is_constant(&self) -> bool {
        match self {
            Expression::Constant(_) | Expression::Captured { .. } => true,
            Expression::Field(_) | Expression::Current => false,
            Expression::Binary { left, right, .. } => left.is_constant() && right.is_constant(),
            Expression::Unary { operand, .. } => operand.is_constant(),
            Expression::Function { args, .. } => args.iter().all(Expression::is_constant),
            Expression::Construct(members) => members.iter().all(|(_, member)| member.is_constant()),
        }
    }
}

impl ops::Not for Expression {
    type Output = Expression;

    fn not(self) -> Expression {
        self.unary(UnaryOperator::Not)
    }
}

impl ops::Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        self.unary(UnaryOperator::Negate)
    }
}

impl ops::Add for Expression {
    type Output = Expression;

    fn add(self, right: Expression) -> Expression {
        self.binary(BinaryOperator::Add, right)
    }
}

impl ops::Sub for Expression {
    type Output = Expression;

    fn sub(self, right: Expression) -> Expression {
        self.binary(BinaryOperator::Subtract, right)
    }
}

impl ops::Mul for Expression {
    type Output = Expression;

    fn mul(self, right: Expression) -> Expression {
        self.binary(BinaryOperator::Multiply, right)
    }
}

impl ops::Div for Expression {
    type Output = Expression;

    fn div(self, right: Expression) -> Expression {
        self.binary(BinaryOperator::Divide, right)
    }
}

impl ops::Rem for Expression {
    type Output = Expression;

    fn rem(self, right: Expression) -> Expression {
        self.binary(BinaryOperator::Remainder, right)
    }
}
