//! Error types for metaview.
//!
//! Only failures that must reach the caller live here. Config-parse and
//! expression-compile failures never surface as errors: they degrade to safe
//! defaults and are reported through [`crate::diag::DiagnosticSink`].

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MetaViewError>;

#[derive(Error, Debug)]
pub enum MetaViewError {
    /// The view block's span could not be resolved in the current host
    /// document text. The save must be retried with a freshly located span,
    /// or abandoned; the core never guesses a location.
    #[error("view block not found in host document")]
    BlockNotFound,

    /// Writing the rewritten host document back to the vault failed. No
    /// partial write occurs; the rewrite is computed fully in memory first.
    #[error("failed to write document '{path}': {reason}")]
    DocumentWrite { path: String, reason: String },

    /// Store-level failure (missing document, unreadable metadata, ...).
    #[error("vault error: {0}")]
    Vault(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),
}
