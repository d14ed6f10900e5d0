//! In-memory vault for testing the pipeline without filesystem I/O.

use super::{set_path, DocumentRef, Metadata, Vault};
use crate::error::{MetaViewError, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

struct Entry {
    doc: DocumentRef,
    text: String,
    metadata: Option<Metadata>,
}

/// Insertion-ordered corpus. Enumeration order is creation order, which
/// keeps pre-sort item order deterministic in tests.
#[derive(Default)]
pub struct MemoryVault {
    entries: Vec<Entry>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document with a metadata snapshot.
    pub fn insert(&mut self, path: impl Into<String>, text: impl Into<String>, metadata: Metadata) {
        self.insert_entry(path, text, Some(metadata));
    }

    /// Add a document that has no parseable metadata.
    pub fn insert_bare(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.insert_entry(path, text, None);
    }

    fn insert_entry(
        &mut self,
        path: impl Into<String>,
        text: impl Into<String>,
        metadata: Option<Metadata>,
    ) {
        let doc = DocumentRef::new(path);
        self.entries.retain(|e| e.doc != doc);
        self.entries.push(Entry {
            doc,
            text: text.into(),
            metadata,
        });
    }

    fn entry(&self, doc: &DocumentRef) -> Result<&Entry> {
        self.entries
            .iter()
            .find(|e| &e.doc == doc)
            .ok_or_else(|| MetaViewError::Vault(format!("no document at '{}'", doc.path)))
    }

    fn entry_mut(&mut self, doc: &DocumentRef) -> Result<&mut Entry> {
        self.entries
            .iter_mut()
            .find(|e| &e.doc == doc)
            .ok_or_else(|| MetaViewError::Vault(format!("no document at '{}'", doc.path)))
    }
}

impl Vault for MemoryVault {
    fn list_documents(&self) -> Vec<DocumentRef> {
        self.entries.iter().map(|e| e.doc.clone()).collect()
    }

    fn metadata(&self, doc: &DocumentRef) -> Option<Metadata> {
        self.entries
            .iter()
            .find(|e| &e.doc == doc)
            .and_then(|e| e.metadata.clone())
    }

    fn read_document(&self, doc: &DocumentRef) -> Result<String> {
        Ok(self.entry(doc)?.text.clone())
    }

    fn write_document(&mut self, doc: &DocumentRef, text: &str) -> Result<()> {
        let entry = self.entry_mut(doc)?;
        entry.text = text.to_string();
        if let Some(metadata) = &mut entry.metadata {
            metadata.size = text.len() as u64;
            metadata.modified = Utc::now();
        }
        Ok(())
    }

    fn update_property(&mut self, doc: &DocumentRef, path: &str, value: Value) -> Result<()> {
        let entry = self.entry_mut(doc)?;
        let metadata = entry.metadata.get_or_insert_with(Metadata::default);
        set_path(&mut metadata.properties, path, value);
        Ok(())
    }
}

/// Fixed timestamp for deterministic fixtures.
pub fn fixture_time(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).single().unwrap_or_default()
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use serde_json::Map;

    /// Builder over [`MemoryVault`] for pipeline tests.
    #[derive(Default)]
    pub struct VaultFixture {
        pub vault: MemoryVault,
        day: u32,
    }

    impl VaultFixture {
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a document with frontmatter-style properties.
        pub fn with_document(mut self, path: &str, properties: Value) -> Self {
            self.day += 1;
            let props: Map<String, Value> = properties
                .as_object()
                .cloned()
                .unwrap_or_default();
            let text = format!("# {path}\n\nbody of {path}\n");
            let metadata = Metadata {
                properties: props,
                tags: Vec::new(),
                created: fixture_time(self.day),
                modified: fixture_time(self.day),
                size: text.len() as u64,
            };
            self.vault.insert(path, text, metadata);
            self
        }

        /// Add a document with tags on top of properties.
        pub fn with_tagged_document(
            mut self,
            path: &str,
            properties: Value,
            tags: &[&str],
        ) -> Self {
            self = self.with_document(path, properties);
            if let Some(entry) = self.vault.entries.last_mut() {
                if let Some(metadata) = &mut entry.metadata {
                    metadata.tags = tags.iter().map(|t| t.to_string()).collect();
                }
            }
            self
        }

        /// Add a document with no metadata at all.
        pub fn with_bare_document(mut self, path: &str) -> Self {
            self.vault.insert_bare(path, format!("raw {path}"));
            self
        }

        /// Add `count` documents named `note-1.md` .. `note-N.md`.
        pub fn with_documents(mut self, count: usize) -> Self {
            for i in 1..=count {
                self = self.with_document(&format!("note-{i}.md"), serde_json::json!({}));
            }
            self
        }
    }
}

#[cfg(any(test, feature = "test_utils"))]
pub use fixtures::VaultFixture;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_and_list_preserves_order() {
        let fixture = VaultFixture::new()
            .with_document("b.md", json!({}))
            .with_document("a.md", json!({}))
            .with_document("c.md", json!({}));

        let docs = fixture.vault.list_documents();
        let paths: Vec<_> = docs.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["b.md", "a.md", "c.md"]);
    }

    #[test]
    fn reinsert_replaces_in_place() {
        let mut vault = MemoryVault::new();
        vault.insert_bare("a.md", "one");
        vault.insert_bare("a.md", "two");
        assert_eq!(vault.list_documents().len(), 1);
        assert_eq!(
            vault.read_document(&DocumentRef::new("a.md")).unwrap(),
            "two"
        );
    }

    #[test]
    fn bare_documents_have_no_metadata() {
        let fixture = VaultFixture::new().with_bare_document("raw.md");
        assert!(fixture.vault.metadata(&DocumentRef::new("raw.md")).is_none());
    }

    #[test]
    fn read_missing_document_is_a_vault_error() {
        let vault = MemoryVault::new();
        let err = vault.read_document(&DocumentRef::new("nope.md")).unwrap_err();
        assert!(matches!(err, MetaViewError::Vault(_)));
    }

    #[test]
    fn write_updates_size_and_modified() {
        let mut fixture = VaultFixture::new().with_document("a.md", json!({}));
        let doc = DocumentRef::new("a.md");
        let before = fixture.vault.metadata(&doc).unwrap();

        fixture.vault.write_document(&doc, "longer content here").unwrap();
        let after = fixture.vault.metadata(&doc).unwrap();
        assert_eq!(after.size, "longer content here".len() as u64);
        assert!(after.modified >= before.modified);
    }

    #[test]
    fn update_property_routes_through_dotted_path() {
        let mut fixture =
            VaultFixture::new().with_document("a.md", json!({"Project": {"Owner": "x"}}));
        let doc = DocumentRef::new("a.md");

        fixture
            .vault
            .update_property(&doc, "project.owner", json!("y"))
            .unwrap();

        let metadata = fixture.vault.metadata(&doc).unwrap();
        assert_eq!(metadata.properties["Project"]["Owner"], json!("y"));
    }
}
