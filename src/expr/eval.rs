//! Expression evaluation against a caller-provided environment.

use super::{BinaryOp, Expr, UnaryOp, Value};
use std::cmp::Ordering;
use thiserror::Error;

/// Evaluation failure. These are user-code failures, not crate errors: the
/// recoverable boundary in [`crate::compile`] absorbs them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct EvalError(pub String);

impl EvalError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Name resolution for dotted paths.
///
/// Unknown paths resolve to [`Value::Null`] rather than failing: a filter
/// over a heterogeneous corpus routinely references properties that most
/// documents do not carry.
pub trait Bindings {
    fn resolve(&self, path: &[String]) -> Value;
}

/// Evaluate an expression.
pub fn eval(expr: &Expr, env: &dyn Bindings) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Path(path) => Ok(env.resolve(path)),
        Expr::Unary { op, expr } => {
            let value = eval(expr, env)?;
            match op {
                UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                UnaryOp::Neg => match value.as_number() {
                    Some(n) => Ok(Value::Number(-n)),
                    None => Err(EvalError::new(format!(
                        "cannot negate {}",
                        type_name(&value)
                    ))),
                },
            }
        }
        Expr::Binary { op, lhs, rhs } => eval_binary(*op, lhs, rhs, env),
        Expr::Call { name, args } => {
            let args = args
                .iter()
                .map(|arg| eval(arg, env))
                .collect::<Result<Vec<_>, _>>()?;
            call(name, &args)
        }
    }
}

fn eval_binary(op: BinaryOp, lhs: &Expr, rhs: &Expr, env: &dyn Bindings) -> Result<Value, EvalError> {
    // Short-circuit logic first
    match op {
        BinaryOp::And => {
            let left = eval(lhs, env)?;
            if !left.is_truthy() {
                return Ok(Value::Bool(false));
            }
            return Ok(Value::Bool(eval(rhs, env)?.is_truthy()));
        }
        BinaryOp::Or => {
            let left = eval(lhs, env)?;
            if left.is_truthy() {
                return Ok(Value::Bool(true));
            }
            return Ok(Value::Bool(eval(rhs, env)?.is_truthy()));
        }
        _ => {}
    }

    let left = eval(lhs, env)?;
    let right = eval(rhs, env)?;

    match op {
        BinaryOp::Eq => Ok(Value::Bool(loose_eq(&left, &right))),
        BinaryOp::Ne => Ok(Value::Bool(!loose_eq(&left, &right))),
        BinaryOp::Lt => ordered(&left, &right).map(|o| Value::Bool(o == Ordering::Less)),
        BinaryOp::LtEq => ordered(&left, &right).map(|o| Value::Bool(o != Ordering::Greater)),
        BinaryOp::Gt => ordered(&left, &right).map(|o| Value::Bool(o == Ordering::Greater)),
        BinaryOp::GtEq => ordered(&left, &right).map(|o| Value::Bool(o != Ordering::Less)),
        BinaryOp::Add => match (&left, &right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
            _ => Err(numeric_op_error("+", &left, &right)),
        },
        BinaryOp::Sub => numeric(op, &left, &right, |a, b| a - b),
        BinaryOp::Mul => numeric(op, &left, &right, |a, b| a * b),
        BinaryOp::Div => {
            let (a, b) = both_numbers("/", &left, &right)?;
            if b == 0.0 {
                return Err(EvalError::new("division by zero"));
            }
            Ok(Value::Number(a / b))
        }
        BinaryOp::Rem => {
            let (a, b) = both_numbers("%", &left, &right)?;
            if b == 0.0 {
                return Err(EvalError::new("division by zero"));
            }
            Ok(Value::Number(a % b))
        }
        BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
    }
}

/// Equality across types never fails; mismatched types are just unequal.
fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y,
        _ => a == b,
    }
}

/// Relational comparison: numbers by value, strings lexicographically.
fn ordered(a: &Value, b: &Value) -> Result<Ordering, EvalError> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .partial_cmp(y)
            .ok_or_else(|| EvalError::new("cannot compare NaN")),
        (Value::Str(x), Value::Str(y)) => Ok(x.cmp(y)),
        _ => Err(EvalError::new(format!(
            "cannot order {} against {}",
            type_name(a),
            type_name(b)
        ))),
    }
}

fn numeric(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    f: impl Fn(f64, f64) -> f64,
) -> Result<Value, EvalError> {
    let symbol = match op {
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        _ => "?",
    };
    let (a, b) = both_numbers(symbol, left, right)?;
    Ok(Value::Number(f(a, b)))
}

fn both_numbers(symbol: &str, left: &Value, right: &Value) -> Result<(f64, f64), EvalError> {
    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(numeric_op_error(symbol, left, right)),
    }
}

fn numeric_op_error(symbol: &str, left: &Value, right: &Value) -> EvalError {
    EvalError::new(format!(
        "'{symbol}' needs numbers, got {} and {}",
        type_name(left),
        type_name(right)
    ))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::Str(_) => "string",
        Value::List(_) => "list",
    }
}

fn call(name: &str, args: &[Value]) -> Result<Value, EvalError> {
    match name {
        "contains" => {
            let [haystack, needle] = expect_args::<2>(name, args)?;
            match haystack {
                Value::Str(s) => Ok(Value::Bool(s.contains(&needle.render()))),
                Value::List(items) => Ok(Value::Bool(items.iter().any(|v| loose_eq(v, needle)))),
                Value::Null => Ok(Value::Bool(false)),
                other => Err(EvalError::new(format!(
                    "contains() needs a string or list, got {}",
                    type_name(other)
                ))),
            }
        }
        "lower" => {
            let [value] = expect_args::<1>(name, args)?;
            Ok(Value::Str(value.render().to_lowercase()))
        }
        "upper" => {
            let [value] = expect_args::<1>(name, args)?;
            Ok(Value::Str(value.render().to_uppercase()))
        }
        "len" => {
            let [value] = expect_args::<1>(name, args)?;
            match value {
                Value::Str(s) => Ok(Value::Number(s.chars().count() as f64)),
                Value::List(items) => Ok(Value::Number(items.len() as f64)),
                Value::Null => Ok(Value::Number(0.0)),
                other => Err(EvalError::new(format!(
                    "len() needs a string or list, got {}",
                    type_name(other)
                ))),
            }
        }
        "num" => {
            let [value] = expect_args::<1>(name, args)?;
            match value {
                Value::Number(n) => Ok(Value::Number(*n)),
                Value::Bool(b) => Ok(Value::Number(if *b { 1.0 } else { 0.0 })),
                Value::Str(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(Value::Number)
                    .map_err(|_| EvalError::new(format!("cannot parse '{s}' as a number"))),
                other => Err(EvalError::new(format!(
                    "num() cannot convert {}",
                    type_name(other)
                ))),
            }
        }
        "str" => {
            let [value] = expect_args::<1>(name, args)?;
            Ok(Value::Str(value.render()))
        }
        "cmp" => {
            let [a, b] = expect_args::<2>(name, args)?;
            let ordering = ordered(a, b)?;
            Ok(Value::Number(match ordering {
                Ordering::Less => -1.0,
                Ordering::Equal => 0.0,
                Ordering::Greater => 1.0,
            }))
        }
        other => Err(EvalError::new(format!("unknown function '{other}'"))),
    }
}

fn expect_args<'a, const N: usize>(
    name: &str,
    args: &'a [Value],
) -> Result<&'a [Value; N], EvalError> {
    args.try_into()
        .map_err(|_| EvalError::new(format!("{name}() takes {N} argument(s), got {}", args.len())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse;
    use std::collections::HashMap;

    struct MapBindings(HashMap<String, Value>);

    impl Bindings for MapBindings {
        fn resolve(&self, path: &[String]) -> Value {
            let key = path.join(".");
            self.0.get(&key).cloned().unwrap_or(Value::Null)
        }
    }

    fn env(pairs: &[(&str, Value)]) -> MapBindings {
        MapBindings(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    fn run(source: &str, env: &MapBindings) -> Result<Value, EvalError> {
        eval(&parse(source).unwrap(), env)
    }

    #[test]
    fn comparisons_and_logic() {
        let env = env(&[
            ("size", Value::Number(2048.0)),
            ("status", Value::Str("open".into())),
        ]);
        assert_eq!(run("size > 1024", &env).unwrap(), Value::Bool(true));
        assert_eq!(
            run("status == 'open' && size <= 4096", &env).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            run("status == 'done' || size < 100", &env).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn unknown_paths_resolve_to_null() {
        let env = env(&[]);
        assert_eq!(run("missing", &env).unwrap(), Value::Null);
        assert_eq!(run("missing == null", &env).unwrap(), Value::Bool(true));
        assert_eq!(run("!missing", &env).unwrap(), Value::Bool(true));
    }

    #[test]
    fn mismatched_equality_is_unequal_not_error() {
        let env = env(&[("size", Value::Number(10.0))]);
        assert_eq!(run("size == 'ten'", &env).unwrap(), Value::Bool(false));
        assert_eq!(run("size != 'ten'", &env).unwrap(), Value::Bool(true));
    }

    #[test]
    fn mismatched_ordering_is_an_error() {
        let env = env(&[("size", Value::Number(10.0))]);
        let err = run("size < 'ten'", &env).unwrap_err();
        assert!(err.0.contains("cannot order"));
    }

    #[test]
    fn arithmetic() {
        let env = env(&[("n", Value::Number(7.0))]);
        assert_eq!(run("n * 2 + 1", &env).unwrap(), Value::Number(15.0));
        assert_eq!(run("-n", &env).unwrap(), Value::Number(-7.0));
        assert_eq!(run("n % 4", &env).unwrap(), Value::Number(3.0));
        assert!(run("n / 0", &env).is_err());
    }

    #[test]
    fn string_concat() {
        let env = env(&[("name", Value::Str("ab".into()))]);
        assert_eq!(run("name + 'c'", &env).unwrap(), Value::Str("abc".into()));
    }

    #[test]
    fn short_circuit_skips_rhs_errors() {
        let env = env(&[("n", Value::Number(0.0))]);
        // rhs would divide by zero, but lhs decides
        assert_eq!(run("false && 1 / n > 0", &env).unwrap(), Value::Bool(false));
        assert_eq!(run("true || 1 / n > 0", &env).unwrap(), Value::Bool(true));
    }

    #[test]
    fn builtin_functions() {
        let env = env(&[
            ("tags", Value::List(vec![
                Value::Str("work".into()),
                Value::Str("rust".into()),
            ])),
            ("name", Value::Str("Weekly Report".into())),
        ]);
        assert_eq!(run("contains(tags, 'rust')", &env).unwrap(), Value::Bool(true));
        assert_eq!(run("contains(tags, 'go')", &env).unwrap(), Value::Bool(false));
        assert_eq!(run("contains(name, 'Report')", &env).unwrap(), Value::Bool(true));
        assert_eq!(run("lower(name)", &env).unwrap(), Value::Str("weekly report".into()));
        assert_eq!(run("len(tags)", &env).unwrap(), Value::Number(2.0));
        assert_eq!(run("len('abc')", &env).unwrap(), Value::Number(3.0));
        assert_eq!(run("num('42')", &env).unwrap(), Value::Number(42.0));
        assert_eq!(run("str(5)", &env).unwrap(), Value::Str("5".into()));
        assert_eq!(run("cmp('a', 'b')", &env).unwrap(), Value::Number(-1.0));
        assert_eq!(run("cmp(2, 2)", &env).unwrap(), Value::Number(0.0));
    }

    #[test]
    fn contains_on_null_is_false() {
        let env = env(&[]);
        assert_eq!(run("contains(missing, 'x')", &env).unwrap(), Value::Bool(false));
    }

    #[test]
    fn unknown_function_and_arity_errors() {
        let env = env(&[]);
        assert!(run("nope(1)", &env).unwrap_err().0.contains("unknown function"));
        assert!(run("len(1, 2)", &env).unwrap_err().0.contains("argument"));
    }
}
