//! Diagnostic reporting for recoverable failures.
//!
//! Malformed persisted config and broken user-authored filter/sorter code
//! degrade to safe defaults instead of interrupting a render pass. Each such
//! degradation is reported here so it is visible without being fatal.
//!
//! [`TracingSink`] is the production sink; tests use [`RecordingSink`] to
//! assert on exactly which events fired (and how often).

/// A recoverable failure that was absorbed by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Persisted view config could not be parsed; the full default config
    /// was substituted.
    ConfigParse { message: String },
    /// A custom filter failed to compile or evaluate; the fallback verdict
    /// was used for the affected documents.
    PredicateFailure { source: String, message: String },
    /// A custom sorter failed to compile or evaluate; item order was left
    /// untouched for the affected comparisons.
    ComparatorFailure { source: String, message: String },
}

impl Diagnostic {
    pub fn message(&self) -> &str {
        match self {
            Diagnostic::ConfigParse { message } => message,
            Diagnostic::PredicateFailure { message, .. } => message,
            Diagnostic::ComparatorFailure { message, .. } => message,
        }
    }
}

/// Observability sink for recoverable failures.
///
/// Implementations must not panic and must not assume they are called at
/// most once: the pipeline deduplicates per filter per invocation, but a
/// config with three broken filters reports three events.
pub trait DiagnosticSink {
    fn report(&self, diag: Diagnostic);
}

/// Default sink: forwards every event to `tracing` at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diag: Diagnostic) {
        match diag {
            Diagnostic::ConfigParse { message } => {
                tracing::warn!(target: "metaview::codec", %message, "config parse failed, using defaults");
            }
            Diagnostic::PredicateFailure { source, message } => {
                tracing::warn!(target: "metaview::compile", %source, %message, "custom filter failed");
            }
            Diagnostic::ComparatorFailure { source, message } => {
                tracing::warn!(target: "metaview::compile", %source, %message, "custom sorter failed");
            }
        }
    }
}

/// Sink that ignores everything. Useful when a caller genuinely does not
/// care about degradation (e.g. probing whether a config parses at all).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&self, _diag: Diagnostic) {}
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use std::cell::RefCell;

    /// Records every reported diagnostic for later assertion.
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        events: RefCell<Vec<Diagnostic>>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<Diagnostic> {
            self.events.borrow().clone()
        }

        pub fn count(&self) -> usize {
            self.events.borrow().len()
        }

        pub fn clear(&self) {
            self.events.borrow_mut().clear();
        }
    }

    impl DiagnosticSink for RecordingSink {
        fn report(&self, diag: Diagnostic) {
            self.events.borrow_mut().push(diag);
        }
    }
}

#[cfg(any(test, feature = "test_utils"))]
pub use fixtures::RecordingSink;
