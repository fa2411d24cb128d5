// Function Registry
//
// Function calls are resolved through an explicit table keyed by name and
// arity. Pipelines check every call against this table when they are built,
// so an unsupported call fails before any element is evaluated.
//
// String functions are ordinal: they operate on Unicode scalar values and
// never consult locale collation. Positions and lengths count characters.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::query::executor::result::{DataValue, QueryError, QueryResult};
use crate::query::expression::coercion;

/// Typed evaluation function over already-evaluated arguments
pub type FunctionImpl = fn(&[DataValue]) -> QueryResult<DataValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

pub struct FunctionRegistry {
    functions: HashMap<String, Vec<(Arity, FunctionImpl)>>,
}

/// Built-in functions available to every pipeline
pub static FUNCTIONS: Lazy<FunctionRegistry> = Lazy::new(FunctionRegistry::builtin);

impl FunctionRegistry {
    pub fn new() -> Self {
        FunctionRegistry { functions: HashMap::new() }
    }

    pub fn builtin() -> Self {
        let mut registry = FunctionRegistry::new();
        registry.register("starts_with", Arity::Exact(2), starts_with);
        registry.register("ends_with", Arity::Exact(2), ends_with);
        registry.register("contains", Arity::Exact(2), contains);
        registry.register("index_of", Arity::Exact(2), index_of);
        registry.register("length", Arity::Exact(1), length);
        registry.register("to_upper", Arity::Exact(1), to_upper);
        registry.register("to_lower", Arity::Exact(1), to_lower);
        registry.register("trim", Arity::Exact(1), trim_whitespace);
        registry.register("trim", Arity::Exact(2), trim);
        registry.register("trim_start", Arity::Exact(2), trim_start);
        registry.register("trim_end", Arity::Exact(2), trim_end);
        registry.register("substring", Arity::Exact(2), substring);
        registry.register("substring", Arity::Exact(3), substring);
        registry.register("concat", Arity::AtLeast(1), concat);
        registry.register("coalesce", Arity::AtLeast(1), coalesce);
        registry.register("abs", Arity::Exact(1), abs);
        registry
    }

    pub fn register(&mut self, name: &str, arity: Arity, function: FunctionImpl) {
        self.functions
            .entry(name.to_string())
            .or_default()
            .push((arity, function));
    }

    /// Resolve a call, failing with `InvalidArgument` for unknown names or
    /// unsupported arities.
    pub fn resolve(&self, name: &str, arg_count: usize) -> QueryResult<FunctionImpl> {
        let overloads = self
            .functions
            .get(name)
            .ok_or_else(|| QueryError::InvalidArgument(format!("Unsupported function '{}'", name)))?;
        overloads
            .iter()
            .find(|(arity, _)| arity.accepts(arg_count))
            .map(|(_, function)| *function)
            .ok_or_else(|| {
                QueryError::InvalidArgument(format!(
                    "Function '{}' does not accept {} argument(s)",
                    name, arg_count
                ))
            })
    }

    pub fn contains(&self, name: &str, arg_count: usize) -> bool {
        self.resolve(name, arg_count).is_ok()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn text_arg<'a>(function: &str, value: &'a DataValue) -> QueryResult<&'a str> {
    value.as_text().ok_or_else(|| {
        QueryError::TypeError(format!(
            "{} expects a text argument, got {}",
            function,
            value.type_name()
        ))
    })
}

fn integer_arg(function: &str, value: &DataValue) -> QueryResult<i64> {
    value.as_integer().ok_or_else(|| {
        QueryError::TypeError(format!(
            "{} expects an integer argument, got {}",
            function,
            value.type_name()
        ))
    })
}

fn any_null(args: &[DataValue]) -> bool {
    args.iter().any(DataValue::is_null)
}

fn starts_with(args: &[DataValue]) -> QueryResult<DataValue> {
    if any_null(args) {
        return Ok(DataValue::Null);
    }
    let s = text_arg("starts_with", &args[0])?;
    let prefix = text_arg("starts_with", &args[1])?;
    Ok(DataValue::Boolean(s.starts_with(prefix)))
}

fn ends_with(args: &[DataValue]) -> QueryResult<DataValue> {
    if any_null(args) {
        return Ok(DataValue::Null);
    }
    let s = text_arg("ends_with", &args[0])?;
    let suffix = text_arg("ends_with", &args[1])?;
    Ok(DataValue::Boolean(s.ends_with(suffix)))
}

/// Substring test on text, membership test on lists.
fn contains(args: &[DataValue]) -> QueryResult<DataValue> {
    match (&args[0], &args[1]) {
        (DataValue::Null, _) => Ok(DataValue::Null),
        // An absent member never matches
        (DataValue::List(_), DataValue::Null) => Ok(DataValue::Boolean(false)),
        (DataValue::List(items), item) => Ok(DataValue::Boolean(items.contains(item))),
        (DataValue::Text(_), DataValue::Null) => Ok(DataValue::Null),
        (DataValue::Text(s), needle) => {
            let needle = text_arg("contains", needle)?;
            Ok(DataValue::Boolean(s.contains(needle)))
        }
        (other, _) => Err(QueryError::TypeError(format!(
            "contains expects text or a list, got {}",
            other.type_name()
        ))),
    }
}

/// Character position of the first occurrence, or -1.
fn index_of(args: &[DataValue]) -> QueryResult<DataValue> {
    if any_null(args) {
        return Ok(DataValue::Null);
    }
    let s = text_arg("index_of", &args[0])?;
    let needle = text_arg("index_of", &args[1])?;
    let position = match s.find(needle) {
        Some(byte_offset) => s[..byte_offset].chars().count() as i64,
        None => -1,
    };
    Ok(DataValue::Integer(position))
}

fn length(args: &[DataValue]) -> QueryResult<DataValue> {
    match &args[0] {
        DataValue::Null => Ok(DataValue::Null),
        DataValue::Text(s) => Ok(DataValue::Integer(s.chars().count() as i64)),
        DataValue::List(items) => Ok(DataValue::Integer(items.len() as i64)),
        other => Err(QueryError::TypeError(format!(
            "length expects text or a list, got {}",
            other.type_name()
        ))),
    }
}

fn to_upper(args: &[DataValue]) -> QueryResult<DataValue> {
    if any_null(args) {
        return Ok(DataValue::Null);
    }
    Ok(DataValue::Text(text_arg("to_upper", &args[0])?.to_uppercase()))
}

fn to_lower(args: &[DataValue]) -> QueryResult<DataValue> {
    if any_null(args) {
        return Ok(DataValue::Null);
    }
    Ok(DataValue::Text(text_arg("to_lower", &args[0])?.to_lowercase()))
}

fn trim_whitespace(args: &[DataValue]) -> QueryResult<DataValue> {
    if any_null(args) {
        return Ok(DataValue::Null);
    }
    Ok(DataValue::Text(text_arg("trim", &args[0])?.trim().to_string()))
}

enum TrimSide {
    Start,
    End,
    Both,
}

fn trim_chars(function: &str, args: &[DataValue], side: TrimSide) -> QueryResult<DataValue> {
    if args[0].is_null() {
        return Ok(DataValue::Null);
    }
    let s = text_arg(function, &args[0])?;
    let chars: Vec<char> = match &args[1] {
        DataValue::Null => Vec::new(),
        other => text_arg(function, other)?.chars().collect(),
    };
    let matches = |c: char| chars.contains(&c);
    let trimmed = match side {
        TrimSide::Start => s.trim_start_matches(matches),
        TrimSide::End => s.trim_end_matches(matches),
        TrimSide::Both => s.trim_matches(matches),
    };
    Ok(DataValue::Text(trimmed.to_string()))
}

fn trim(args: &[DataValue]) -> QueryResult<DataValue> {
    trim_chars("trim", args, TrimSide::Both)
}

fn trim_start(args: &[DataValue]) -> QueryResult<DataValue> {
    trim_chars("trim_start", args, TrimSide::Start)
}

fn trim_end(args: &[DataValue]) -> QueryResult<DataValue> {
    trim_chars("trim_end", args, TrimSide::End)
}

/// `substring(s, start)` or `substring(s, start, len)`, counted in characters.
fn substring(args: &[DataValue]) -> QueryResult<DataValue> {
    if any_null(args) {
        return Ok(DataValue::Null);
    }
    let s = text_arg("substring", &args[0])?;
    let total = s.chars().count() as i64;
    let start = integer_arg("substring", &args[1])?;
    let len = match args.get(2) {
        Some(value) => integer_arg("substring", value)?,
        None => total - start,
    };
    if start < 0 || len < 0 || start > total || start + len > total {
        return Err(QueryError::InvalidArgument(format!(
            "substring({}, {}) is out of range for text of length {}",
            start, len, total
        )));
    }
    Ok(DataValue::Text(s.chars().skip(start as usize).take(len as usize).collect()))
}

fn concat(args: &[DataValue]) -> QueryResult<DataValue> {
    Ok(DataValue::Text(args.iter().map(DataValue::to_text).collect()))
}

fn coalesce(args: &[DataValue]) -> QueryResult<DataValue> {
    Ok(args.iter().find(|v| !v.is_null()).cloned().unwrap_or(DataValue::Null))
}

fn abs(args: &[DataValue]) -> QueryResult<DataValue> {
    match &args[0] {
        DataValue::Null => Ok(DataValue::Null),
        DataValue::Integer(i) => i.checked_abs().map(DataValue::Integer).ok_or(QueryError::NumericOverflow),
        DataValue::Decimal(d) => Ok(DataValue::Decimal(d.abs())),
        DataValue::Float(f) => Ok(DataValue::Float(f.abs())),
        other => coercion::negate(other),
    }
}
