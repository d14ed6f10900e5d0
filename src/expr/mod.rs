//! # Expression language for user-authored filters and sorters
//!
//! Custom filter and sorter code is a small, total expression language: no
//! loops, no recursion, no assignment. An expression either evaluates to a
//! [`Value`] or fails with an [`EvalError`]; it cannot hang the pipeline.
//!
//! ```text
//! status == "open" && size > 1024
//! contains(tags, "project") || priority >= 3
//! cmp(lower(a.name), lower(b.name))        # comparator form
//! ```
//!
//! Dotted identifier paths are resolved by the caller through [`Bindings`]:
//! the compiler knows nothing about documents, only the evaluation
//! environment does.
//!
//! Compilation: [`parse`] → [`Expr`]. Evaluation: [`eval`]. The
//! recoverable-failure boundary around both lives in [`crate::compile`].

mod eval;
mod lexer;
mod parser;

pub use eval::{eval, Bindings, EvalError};
pub use parser::{parse, BinaryOp, Expr, UnaryOp};

use thiserror::Error;

/// A runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    /// Truthiness, used to coerce a predicate result:
    /// `null`/`false` are false, numbers are true unless zero, strings and
    /// lists are true unless empty.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Render for lexicographic comparison and display.
    pub fn render(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Value::Str(s) => s.clone(),
            Value::List(items) => items
                .iter()
                .map(Value::render)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(items) => Value::List(items.iter().map(Value::from).collect()),
            // Nested objects have no expression-level representation;
            // resolve deeper with a dotted path instead.
            serde_json::Value::Object(_) => Value::Null,
        }
    }
}

/// Failure to turn source text into an [`Expr`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (at offset {offset})")]
pub struct CompileError {
    pub message: String,
    pub offset: usize,
}

impl CompileError {
    pub(crate) fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}
