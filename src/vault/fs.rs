//! Filesystem vault: markdown files with YAML frontmatter.
//!
//! Layout: any tree of `.md` files under a root directory. Paths are
//! vault-root-relative with `/` separators on every platform.
//!
//! Frontmatter is the leading block between `---` fence lines:
//!
//! ```text
//! ---
//! status: open
//! tags: [work, rust]
//! ---
//! body...
//! ```
//!
//! Malformed frontmatter degrades to an empty property map rather than
//! hiding the document; only an unreadable file yields no metadata.
//! Property writes rewrite the frontmatter block only; the body stays
//! byte-identical.

use super::{set_path, DocumentRef, Metadata, Vault};
use crate::error::{MetaViewError, Result};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

const DOC_EXT: &str = ".md";

pub struct FileVault {
    root: PathBuf,
}

impl FileVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn abs_path(&self, doc: &DocumentRef) -> PathBuf {
        self.root.join(&doc.path)
    }

    fn collect_docs(&self, dir: &Path, out: &mut Vec<DocumentRef>) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                self.collect_docs(&path, out);
            } else if path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(DOC_EXT))
            {
                if let Ok(rel) = path.strip_prefix(&self.root) {
                    let rel = rel
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/");
                    out.push(DocumentRef::new(rel));
                }
            }
        }
    }
}

impl Vault for FileVault {
    fn list_documents(&self) -> Vec<DocumentRef> {
        let mut docs = Vec::new();
        self.collect_docs(&self.root, &mut docs);
        // read_dir order is platform-dependent; sort for a stable corpus
        // enumeration within one scan
        docs.sort_by(|a, b| a.path.cmp(&b.path));
        docs
    }

    fn metadata(&self, doc: &DocumentRef) -> Option<Metadata> {
        let abs = self.abs_path(doc);
        let text = fs::read_to_string(&abs).ok()?;
        let fs_meta = fs::metadata(&abs).ok()?;

        let (frontmatter, body) = split_frontmatter(&text);
        let properties = frontmatter
            .map(parse_properties)
            .unwrap_or_default();
        let tags = collect_tags(&properties, body);

        let modified = fs_meta
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_default();
        let created = fs_meta
            .created()
            .map(DateTime::<Utc>::from)
            .unwrap_or(modified);

        Some(Metadata {
            properties,
            tags,
            created,
            modified,
            size: fs_meta.len(),
        })
    }

    fn read_document(&self, doc: &DocumentRef) -> Result<String> {
        fs::read_to_string(self.abs_path(doc)).map_err(MetaViewError::Io)
    }

    fn write_document(&mut self, doc: &DocumentRef, text: &str) -> Result<()> {
        fs::write(self.abs_path(doc), text).map_err(|err| MetaViewError::DocumentWrite {
            path: doc.path.clone(),
            reason: err.to_string(),
        })
    }

    fn update_property(&mut self, doc: &DocumentRef, path: &str, value: Value) -> Result<()> {
        let text = self.read_document(doc)?;
        let (frontmatter, body) = split_frontmatter(&text);
        let mut properties = frontmatter.map(parse_properties).unwrap_or_default();
        set_path(&mut properties, path, value);

        let yaml = serde_yaml::to_string(&properties)?;
        let new_text = format!("---\n{yaml}---\n{body}");
        self.write_document(doc, &new_text)
    }
}

/// Split a document into `(frontmatter, body)`. Returns `None` frontmatter
/// when there is no leading fence pair; the body is always the exact
/// remainder of the input.
fn split_frontmatter(text: &str) -> (Option<&str>, &str) {
    let rest = match text.strip_prefix("---\n") {
        Some(rest) => rest,
        None => match text.strip_prefix("---\r\n") {
            Some(rest) => rest,
            None => return (None, text),
        },
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if trimmed == "---" || trimmed == "..." {
            let frontmatter = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(frontmatter), body);
        }
        offset += line.len();
    }
    (None, text)
}

fn parse_properties(frontmatter: &str) -> Map<String, Value> {
    match serde_yaml::from_str::<Value>(frontmatter) {
        Ok(Value::Object(map)) => map,
        // Scalar, sequence, or malformed frontmatter: no usable properties
        _ => Map::new(),
    }
}

/// Frontmatter `tags` (string or list) plus inline `#tag` tokens, unique,
/// in first-seen order.
fn collect_tags(properties: &Map<String, Value>, body: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let mut push = |tag: &str| {
        let tag = tag.trim().trim_start_matches('#');
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    };

    match properties.get("tags").or_else(|| properties.get("Tags")) {
        Some(Value::String(s)) => {
            for tag in s.split(',') {
                push(tag);
            }
        }
        Some(Value::Array(items)) => {
            for item in items {
                if let Value::String(s) = item {
                    push(s);
                }
            }
        }
        _ => {}
    }

    for token in body.split_whitespace() {
        if let Some(tag) = token.strip_prefix('#') {
            let tag: String = tag
                .chars()
                .take_while(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '/'))
                .collect();
            if !tag.is_empty() && !tag.chars().all(|c| c.is_ascii_digit()) {
                push(&tag);
            }
        }
    }

    tags
}
