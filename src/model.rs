//! # Domain Model: the persisted view configuration
//!
//! A [`ViewConfig`] is the unit that lives inside a fenced code block in the
//! host document. It is created with defaults the first time a block renders
//! empty, mutated only through the configuration UI, and saved exclusively
//! through [`crate::persist`].
//!
//! ## Serialized shape
//!
//! The config serializes as camelCase YAML so that blocks written by the
//! original plugin ecosystem remain readable:
//!
//! ```yaml
//! fields:
//!   - type: fileData
//!     value: name
//!     alias: Note
//!   - type: property
//!     value: status
//! filters:
//!   - kind: custom
//!     code: size > 1024
//! folder: projects/
//! sorter:
//!   ascending: true
//!   builtin:
//!     type: fileData
//!     value: name
//! pageNumber: 1
//! pageSize: 10
//! ```
//!
//! Every field is `#[serde(default)]`: partial or malformed text can never
//! produce a partially-initialized config (see [`crate::codec::decode`]).
//!
//! ## Invariant
//!
//! `fields` empty ⇒ the view is unconfigured and renders a placeholder
//! instead of a table ([`ViewConfig::is_configured`]).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The six file attributes a view can show without consulting the
/// property map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileAttr {
    Link,
    Name,
    Path,
    Created,
    Modified,
    Size,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedType {
    Heading,
    Block,
}

/// A reference to the data a filter or builtin sorter operates on.
///
/// Unlike [`Field`] this carries no presentation attributes; it only names
/// the value being tested or compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum FieldRef {
    FileData(FileAttr),
    /// Dotted path into the document's property map, matched
    /// case-insensitively per segment.
    Property(String),
    Tags,
}

/// A column of the rendered table.
///
/// Each variant carries `alias` (display label override, empty = derive from
/// the field itself) and `col_width` (persisted pixel width from the last
/// resize session).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Field {
    FileData {
        value: FileAttr,
        #[serde(default)]
        alias: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        col_width: Option<f64>,
    },
    Property {
        value: String,
        #[serde(default)]
        alias: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        col_width: Option<f64>,
    },
    Tags {
        #[serde(default)]
        alias: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        col_width: Option<f64>,
    },
    Embed {
        /// Subpath spec (`#Heading` or `#^block-id`), passed through to the
        /// external embed renderer untouched.
        value: String,
        embed_type: EmbedType,
        #[serde(default)]
        alias: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        col_width: Option<f64>,
    },
}

impl Field {
    pub fn file_data(attr: FileAttr) -> Self {
        Field::FileData {
            value: attr,
            alias: String::new(),
            col_width: None,
        }
    }

    pub fn property(path: impl Into<String>) -> Self {
        Field::Property {
            value: path.into(),
            alias: String::new(),
            col_width: None,
        }
    }

    pub fn tags() -> Self {
        Field::Tags {
            alias: String::new(),
            col_width: None,
        }
    }

    pub fn alias(&self) -> &str {
        match self {
            Field::FileData { alias, .. }
            | Field::Property { alias, .. }
            | Field::Tags { alias, .. }
            | Field::Embed { alias, .. } => alias,
        }
    }

    pub fn col_width(&self) -> Option<f64> {
        match self {
            Field::FileData { col_width, .. }
            | Field::Property { col_width, .. }
            | Field::Tags { col_width, .. }
            | Field::Embed { col_width, .. } => *col_width,
        }
    }

    pub fn set_col_width(&mut self, width: Option<f64>) {
        match self {
            Field::FileData { col_width, .. }
            | Field::Property { col_width, .. }
            | Field::Tags { col_width, .. }
            | Field::Embed { col_width, .. } => *col_width = width,
        }
    }

    /// Column header: the alias when set, otherwise a label derived from
    /// the field itself.
    pub fn header(&self) -> String {
        if !self.alias().is_empty() {
            return self.alias().to_string();
        }
        match self {
            Field::FileData { value, .. } => format!("{value:?}").to_lowercase(),
            Field::Property { value, .. } => value.clone(),
            Field::Tags { .. } => "tags".to_string(),
            Field::Embed { value, .. } => value.clone(),
        }
    }
}

/// Builtin comparison operators for typed filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypedOp {
    /// Exact equality match.
    Eq,
    /// Not equal.
    Ne,
    /// List contains the value, or string contains the substring.
    Contains,
    /// List contains ALL specified values (AND logic).
    ContainsAll,
    /// The referenced value is present (metadata exists and resolves).
    Exists,
    /// The referenced value is absent.
    NotExists,
}

/// A filter condition on the match set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Filter {
    /// Builtin, field-scoped comparison.
    Typed {
        field: FieldRef,
        op: TypedOp,
        #[serde(default)]
        value: serde_json::Value,
    },
    /// User-authored expression, compiled by [`crate::compile`].
    Custom { code: String },
}

impl Filter {
    pub fn custom(code: impl Into<String>) -> Self {
        Filter::Custom { code: code.into() }
    }

    pub fn typed(field: FieldRef, op: TypedOp, value: serde_json::Value) -> Self {
        Filter::Typed { field, op, value }
    }

    /// Display label for the configuration UI.
    pub fn label(&self) -> String {
        match self {
            Filter::Typed { field, op, value } => {
                let field = match field {
                    FieldRef::FileData(attr) => format!("{attr:?}").to_lowercase(),
                    FieldRef::Property(path) => path.clone(),
                    FieldRef::Tags => "tags".to_string(),
                };
                match op {
                    TypedOp::Exists => format!("{field} exists"),
                    TypedOp::NotExists => format!("{field} does not exist"),
                    TypedOp::Eq => format!("{field} == {value}"),
                    TypedOp::Ne => format!("{field} != {value}"),
                    TypedOp::Contains => format!("{field} contains {value}"),
                    TypedOp::ContainsAll => format!("{field} contains all {value}"),
                }
            }
            Filter::Custom { code } => code.lines().next().unwrap_or_default().to_string(),
        }
    }
}

/// Ordering specification.
///
/// Exactly one of `builtin`/`custom` is meaningful at a time; `custom` wins
/// when both are set. A custom comparator is responsible for its own
/// direction: `ascending` is applied only on top of builtin comparisons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sorter {
    #[serde(default = "default_ascending")]
    pub ascending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builtin: Option<FieldRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
}

fn default_ascending() -> bool {
    true
}

impl Default for Sorter {
    fn default() -> Self {
        Self {
            ascending: true,
            builtin: Some(FieldRef::FileData(FileAttr::Name)),
            custom: None,
        }
    }
}

impl Sorter {
    pub fn builtin(field: FieldRef, ascending: bool) -> Self {
        Self {
            ascending,
            builtin: Some(field),
            custom: None,
        }
    }

    pub fn custom(code: impl Into<String>) -> Self {
        Self {
            ascending: true,
            builtin: None,
            custom: Some(code.into()),
        }
    }
}

/// The persisted view configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewConfig {
    pub fields: Vec<Field>,
    pub filters: Vec<Filter>,
    /// Vault-root-relative path prefix; empty = whole corpus. Matched as a
    /// raw string prefix, NOT segment-aware: `"note/a"` also scopes in
    /// `"note/abc"`. Inherited behavior, kept as-is.
    pub folder: String,
    /// Path prefixes to skip, same prefix semantics as `folder`.
    pub excluded_folders: BTreeSet<String>,
    pub sorter: Sorter,
    /// 1-based requested page.
    pub page_number: u32,
    /// Items per page; `<= 0` means a single unlimited page.
    pub page_size: i64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            filters: Vec::new(),
            folder: String::new(),
            excluded_folders: BTreeSet::new(),
            sorter: Sorter::default(),
            page_number: 1,
            page_size: 0,
        }
    }
}

impl ViewConfig {
    /// An empty field list means the block was never configured; the
    /// renderer shows a placeholder instead of a table.
    pub fn is_configured(&self) -> bool {
        !self.fields.is_empty()
    }
}
