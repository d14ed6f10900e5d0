//! # Vault Layer
//!
//! The corpus a view queries. The [`Vault`] trait abstracts the document
//! store so the pipeline can run against different backends:
//!
//! - [`fs::FileVault`]: markdown files with YAML frontmatter under a root
//!   directory.
//! - [`memory::MemoryVault`]: deterministic in-memory corpus for testing.
//!
//! ## Metadata snapshots
//!
//! [`Vault::metadata`] returns `None` when a document carries no parseable
//! metadata. The pipeline tolerates this everywhere: metadata-dependent
//! filters treat a missing snapshot as "does not match", and renderers show
//! empty cells.
//!
//! ## Property paths
//!
//! Properties are addressed by dotted paths (`project.owner.email`) matched
//! case-insensitively per segment against existing keys. Writes preserve the
//! casing of keys that already exist and create missing segments as written.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

pub mod fs;
pub mod memory;

pub use fs::FileVault;
pub use memory::MemoryVault;

#[cfg(any(test, feature = "test_utils"))]
pub use memory::VaultFixture;

/// Identifies a document by its vault-root-relative path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentRef {
    pub path: String,
}

impl DocumentRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// File name without directories or the final extension.
    pub fn name(&self) -> &str {
        let base = self.path.rsplit('/').next().unwrap_or(&self.path);
        match base.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => base,
        }
    }
}

/// Cached metadata snapshot for one document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Metadata {
    /// Frontmatter properties, open-ended and possibly nested.
    pub properties: Map<String, Value>,
    /// Unique tags, frontmatter and inline combined, without `#`.
    pub tags: Vec<String>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    /// Content size in bytes.
    pub size: u64,
}

/// Abstract interface for the document corpus.
pub trait Vault {
    /// Enumerate every document. The enumeration order is the corpus's
    /// natural order; it seeds the pre-sort item order and is not
    /// guaranteed stable across scans.
    fn list_documents(&self) -> Vec<DocumentRef>;

    /// Fetch the metadata snapshot, or `None` when the document has no
    /// parseable metadata.
    fn metadata(&self, doc: &DocumentRef) -> Option<Metadata>;

    /// Read the full document text.
    fn read_document(&self, doc: &DocumentRef) -> Result<String>;

    /// Replace the full document text in one atomic write.
    fn write_document(&mut self, doc: &DocumentRef, text: &str) -> Result<()>;

    /// Set the property at `path` (dotted, case-insensitive against
    /// existing keys), creating intermediate maps as needed.
    fn update_property(&mut self, doc: &DocumentRef, path: &str, value: Value) -> Result<()>;
}

/// Resolve a dotted property path, matching each segment case-insensitively.
pub fn resolve_path<'a>(properties: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.').filter(|s| !s.is_empty());
    let first = segments.next()?;
    let mut current = lookup(properties, first)?;
    for segment in segments {
        current = lookup(current.as_object()?, segment)?;
    }
    Some(current)
}

/// Set a dotted property path, creating intermediate objects. Existing key
/// casing wins; missing segments are created as written. A non-object value
/// in the middle of the path is replaced by an object.
pub fn set_path(properties: &mut Map<String, Value>, path: &str, value: Value) {
    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = properties;
    for segment in parents {
        let key = existing_key(current, segment).unwrap_or_else(|| segment.to_string());
        let entry = current
            .entry(key)
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        current = entry
            .as_object_mut()
            .unwrap_or_else(|| unreachable!("entry was just made an object"));
    }

    let key = existing_key(current, last).unwrap_or_else(|| last.to_string());
    current.insert(key, value);
}

fn lookup<'a>(map: &'a Map<String, Value>, segment: &str) -> Option<&'a Value> {
    if let Some(value) = map.get(segment) {
        return Some(value);
    }
    map.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(segment))
        .map(|(_, value)| value)
}

fn existing_key(map: &Map<String, Value>, segment: &str) -> Option<String> {
    if map.contains_key(segment) {
        return Some(segment.to_string());
    }
    map.keys()
        .find(|key| key.eq_ignore_ascii_case(segment))
        .cloned()
}
