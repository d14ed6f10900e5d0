//! The recoverable-failure boundary around user-authored code.
//!
//! [`Predicate`] and [`Comparator`] wrap a compiled expression so that
//! neither compilation nor evaluation failures ever propagate: a broken
//! filter degrades to a policy-chosen verdict (fail-open by default, so a
//! broken filter does not hide the corpus) and a broken sorter degrades to
//! "equal" (no reordering). Every degradation is reported to the sink, at
//! most once per compiled unit. Units are compiled fresh for each matcher
//! or sort invocation, so that means once per filter per invocation.

use crate::diag::{Diagnostic, DiagnosticSink};
use crate::expr::{self, Bindings, Expr};
use std::cell::Cell;
use std::cmp::Ordering;

/// What a broken custom filter should do.
///
/// The original behavior is fail-open; the policy is an explicit argument
/// because fail-closed is a defensible alternative for views where showing
/// too much is worse than showing too little.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailMode {
    /// A broken filter matches everything.
    #[default]
    Open,
    /// A broken filter matches nothing.
    Closed,
}

impl FailMode {
    fn verdict(self) -> bool {
        matches!(self, FailMode::Open)
    }
}

/// A compiled `(document) -> bool` filter.
pub struct Predicate<'s> {
    source: String,
    compiled: Option<Expr>,
    fail_mode: FailMode,
    sink: &'s dyn DiagnosticSink,
    reported: Cell<bool>,
}

impl<'s> Predicate<'s> {
    /// Compile filter source. A parse failure is reported immediately and
    /// yields the fallback predicate.
    pub fn compile(source: &str, fail_mode: FailMode, sink: &'s dyn DiagnosticSink) -> Self {
        let (compiled, reported) = match expr::parse(source) {
            Ok(expr) => (Some(expr), false),
            Err(err) => {
                sink.report(Diagnostic::PredicateFailure {
                    source: source.to_string(),
                    message: err.to_string(),
                });
                (None, true)
            }
        };
        Self {
            source: source.to_string(),
            compiled,
            fail_mode,
            sink,
            reported: Cell::new(reported),
        }
    }

    /// Evaluate against a document environment. Never fails.
    pub fn matches(&self, env: &dyn Bindings) -> bool {
        let Some(expr) = &self.compiled else {
            return self.fail_mode.verdict();
        };
        match expr::eval(expr, env) {
            Ok(value) => value.is_truthy(),
            Err(err) => {
                if !self.reported.replace(true) {
                    self.sink.report(Diagnostic::PredicateFailure {
                        source: self.source.clone(),
                        message: err.to_string(),
                    });
                }
                self.fail_mode.verdict()
            }
        }
    }
}

/// A compiled `(item, item) -> Ordering` sorter.
///
/// The expression sees the two items bound under `a` and `b` and must
/// return a number whose sign gives the ordering. The comparator is
/// responsible for its own direction; the config's `ascending` flag is not
/// applied on top.
pub struct Comparator<'s> {
    source: String,
    compiled: Option<Expr>,
    sink: &'s dyn DiagnosticSink,
    reported: Cell<bool>,
}

impl<'s> Comparator<'s> {
    pub fn compile(source: &str, sink: &'s dyn DiagnosticSink) -> Self {
        let (compiled, reported) = match expr::parse(source) {
            Ok(expr) => (Some(expr), false),
            Err(err) => {
                sink.report(Diagnostic::ComparatorFailure {
                    source: source.to_string(),
                    message: err.to_string(),
                });
                (None, true)
            }
        };
        Self {
            source: source.to_string(),
            compiled,
            sink,
            reported: Cell::new(reported),
        }
    }

    /// Compare under a pair environment. Never fails; degraded comparisons
    /// are `Equal`, leaving the (stable) order untouched.
    pub fn compare(&self, env: &dyn Bindings) -> Ordering {
        let Some(expr) = &self.compiled else {
            return Ordering::Equal;
        };
        let outcome = match expr::eval(expr, env) {
            Ok(value) => match value.as_number() {
                Some(n) => Ok(n),
                None => Err(expr::EvalError(format!(
                    "comparator must return a number, got {value:?}"
                ))),
            },
            Err(err) => Err(err),
        };
        match outcome {
            Ok(n) if n < 0.0 => Ordering::Less,
            Ok(n) if n > 0.0 => Ordering::Greater,
            Ok(_) => Ordering::Equal,
            Err(err) => {
                if !self.reported.replace(true) {
                    self.sink.report(Diagnostic::ComparatorFailure {
                        source: self.source.clone(),
                        message: err.to_string(),
                    });
                }
                Ordering::Equal
            }
        }
    }
}
