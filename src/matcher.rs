//! Corpus matcher: full rescan, folder scoping, AND across filters.
//!
//! Every invocation rescans the whole corpus; nothing is memoized. Per
//! document, in corpus enumeration order:
//!
//! 1. Skip unless the path starts with `folder`. This is a raw prefix
//!    match, deliberately not segment-aware: `"note/a"` also scopes in
//!    `"note/abc"`. Inherited behavior; changing it would change which
//!    documents saved views include.
//! 2. Skip when any excluded folder is a prefix of the path.
//! 3. Fetch the metadata snapshot (`None` is tolerated).
//! 4. Keep the document only if every filter matches (logical AND).
//!
//! Custom filters are compiled fresh per invocation, so a broken filter is
//! reported exactly once per invocation no matter how many documents it
//! failed on (see [`crate::compile`]).

use crate::compile::{FailMode, Predicate};
use crate::diag::DiagnosticSink;
use crate::expr::{Bindings, Value};
use crate::model::{FieldRef, FileAttr, Filter, TypedOp};
use crate::vault::{resolve_path, DocumentRef, Metadata, Vault};
use std::collections::BTreeSet;

/// One matched document with its metadata snapshot. Ephemeral: recomputed
/// on every render pass, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedItem {
    pub doc: DocumentRef,
    pub metadata: Option<Metadata>,
}

impl MatchedItem {
    pub fn new(doc: DocumentRef, metadata: Option<Metadata>) -> Self {
        Self { doc, metadata }
    }
}

/// Scan the corpus and collect every document matching the scope and all
/// filters.
pub fn run(
    vault: &impl Vault,
    filters: &[Filter],
    folder: &str,
    excluded_folders: &BTreeSet<String>,
    fail_mode: FailMode,
    sink: &dyn DiagnosticSink,
) -> Vec<MatchedItem> {
    let compiled: Vec<CompiledFilter<'_>> = filters
        .iter()
        .map(|filter| CompiledFilter::new(filter, fail_mode, sink))
        .collect();

    let mut matched = Vec::new();
    for doc in vault.list_documents() {
        if !folder.is_empty() && !doc.path.starts_with(folder) {
            continue;
        }
        if excluded_folders
            .iter()
            .any(|prefix| !prefix.is_empty() && doc.path.starts_with(prefix.as_str()))
        {
            continue;
        }

        let item = MatchedItem::new(doc.clone(), vault.metadata(&doc));
        if compiled.iter().all(|filter| filter.matches(&item)) {
            matched.push(item);
        }
    }
    matched
}

enum CompiledFilter<'s> {
    Typed {
        field: &'s FieldRef,
        op: TypedOp,
        value: &'s serde_json::Value,
    },
    Custom(Predicate<'s>),
}

impl<'s> CompiledFilter<'s> {
    fn new(filter: &'s Filter, fail_mode: FailMode, sink: &'s dyn DiagnosticSink) -> Self {
        match filter {
            Filter::Typed { field, op, value } => CompiledFilter::Typed {
                field,
                op: *op,
                value,
            },
            Filter::Custom { code } => {
                CompiledFilter::Custom(Predicate::compile(code, fail_mode, sink))
            }
        }
    }

    fn matches(&self, item: &MatchedItem) -> bool {
        match self {
            CompiledFilter::Typed { field, op, value } => typed_matches(item, field, *op, value),
            CompiledFilter::Custom(predicate) => predicate.matches(&ItemBindings { item }),
        }
    }
}

fn typed_matches(item: &MatchedItem, field: &FieldRef, op: TypedOp, value: &serde_json::Value) -> bool {
    let resolved = field_ref_value(item, field);
    let expected = Value::from(value);

    match op {
        TypedOp::Exists => resolved != Value::Null,
        TypedOp::NotExists => resolved == Value::Null,
        TypedOp::Eq => resolved == expected,
        TypedOp::Ne => resolved != expected,
        TypedOp::Contains => contains(&resolved, &expected),
        TypedOp::ContainsAll => match &expected {
            Value::List(wanted) => wanted.iter().all(|v| contains(&resolved, v)),
            single => contains(&resolved, single),
        },
    }
}

fn contains(haystack: &Value, needle: &Value) -> bool {
    match haystack {
        Value::List(items) => items.iter().any(|v| v == needle),
        Value::Str(s) => s.contains(&needle.render()),
        _ => false,
    }
}

/// Resolve the value a [`FieldRef`] names on an item. Missing metadata and
/// missing properties both resolve to `Null`, which is how "does not
/// match" falls out of the typed operators.
pub(crate) fn field_ref_value(item: &MatchedItem, field: &FieldRef) -> Value {
    match field {
        FieldRef::FileData(attr) => file_attr_value(item, *attr),
        FieldRef::Property(path) => item
            .metadata
            .as_ref()
            .and_then(|meta| resolve_path(&meta.properties, path))
            .map(Value::from)
            .unwrap_or(Value::Null),
        FieldRef::Tags => match &item.metadata {
            Some(meta) => Value::List(
                meta.tags
                    .iter()
                    .map(|tag| Value::Str(tag.clone()))
                    .collect(),
            ),
            None => Value::Null,
        },
    }
}

fn file_attr_value(item: &MatchedItem, attr: FileAttr) -> Value {
    match attr {
        FileAttr::Link | FileAttr::Name => Value::Str(item.doc.name().to_string()),
        FileAttr::Path => Value::Str(item.doc.path.clone()),
        FileAttr::Created => timestamp(item, |meta| meta.created.timestamp_millis()),
        FileAttr::Modified => timestamp(item, |meta| meta.modified.timestamp_millis()),
        FileAttr::Size => match &item.metadata {
            Some(meta) => Value::Number(meta.size as f64),
            None => Value::Null,
        },
    }
}

fn timestamp(item: &MatchedItem, f: impl Fn(&Metadata) -> i64) -> Value {
    match &item.metadata {
        Some(meta) => Value::Number(f(meta) as f64),
        None => Value::Null,
    }
}

/// Expression environment over one matched item: builtin heads first
/// (`name`, `path`, `size`, `created`, `modified`, `tags`), anything else
/// resolves into the property map.
pub(crate) struct ItemBindings<'a> {
    pub item: &'a MatchedItem,
}

impl Bindings for ItemBindings<'_> {
    fn resolve(&self, path: &[String]) -> Value {
        let Some(head) = path.first() else {
            return Value::Null;
        };

        if path.len() == 1 {
            let builtin = match head.as_str() {
                "name" => Some(FieldRef::FileData(FileAttr::Name)),
                "path" => Some(FieldRef::FileData(FileAttr::Path)),
                "size" => Some(FieldRef::FileData(FileAttr::Size)),
                "created" => Some(FieldRef::FileData(FileAttr::Created)),
                "modified" => Some(FieldRef::FileData(FileAttr::Modified)),
                "tags" => Some(FieldRef::Tags),
                _ => None,
            };
            if let Some(field) = builtin {
                return field_ref_value(self.item, &field);
            }
        }

        field_ref_value(self.item, &FieldRef::Property(path.join(".")))
    }
}
