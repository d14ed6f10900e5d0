//! Table projection: matched items crossed with the configured fields.
//!
//! Rendering here is structural, not visual. Each cell becomes a
//! [`CellValue`] carrying the data and enough shape for a frontend to draw
//! it; property and embed cells are passed through for the host to resolve
//! (embeds especially, since transcluding `#Heading` / `#^block-id`
//! content is a host capability).

use crate::matcher::MatchedItem;
use crate::model::{EmbedType, Field, FileAttr};
use crate::vault::resolve_path;
use chrono::{DateTime, Utc};

/// One rendered cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Internal link to the document, with its display label.
    Link { target: String, label: String },
    Text(String),
    Timestamp(DateTime<Utc>),
    Number(f64),
    TagList(Vec<String>),
    /// Property cell: the raw value (if any) plus the path that named it,
    /// so a frontend can offer in-place editing.
    Property {
        path: String,
        value: Option<serde_json::Value>,
    },
    /// Embed cell, resolved by the host. `subpath` is passed through
    /// untouched.
    Embed {
        target: String,
        subpath: String,
        embed_type: EmbedType,
    },
    /// The item has no value for this column.
    Missing,
}

/// One table row: the source item plus one cell per configured field.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub item: MatchedItem,
    pub cells: Vec<CellValue>,
}

/// Project the page's items through the configured fields.
pub fn render_rows(items: &[MatchedItem], fields: &[Field]) -> Vec<Row> {
    items
        .iter()
        .map(|item| Row {
            item: item.clone(),
            cells: fields.iter().map(|field| render_cell(item, field)).collect(),
        })
        .collect()
}

pub fn render_cell(item: &MatchedItem, field: &Field) -> CellValue {
    match field {
        Field::FileData { value, .. } => file_data_cell(item, *value),
        Field::Property { value: path, .. } => CellValue::Property {
            path: path.clone(),
            value: item
                .metadata
                .as_ref()
                .and_then(|meta| resolve_path(&meta.properties, path))
                .cloned(),
        },
        Field::Tags { .. } => match &item.metadata {
            Some(meta) => CellValue::TagList(meta.tags.clone()),
            None => CellValue::TagList(Vec::new()),
        },
        Field::Embed {
            value, embed_type, ..
        } => CellValue::Embed {
            target: item.doc.path.clone(),
            subpath: value.clone(),
            embed_type: *embed_type,
        },
    }
}

fn file_data_cell(item: &MatchedItem, attr: FileAttr) -> CellValue {
    match attr {
        FileAttr::Link => CellValue::Link {
            target: item.doc.path.clone(),
            label: item.doc.name().to_string(),
        },
        FileAttr::Name => CellValue::Text(item.doc.name().to_string()),
        FileAttr::Path => CellValue::Text(item.doc.path.clone()),
        FileAttr::Created => match &item.metadata {
            Some(meta) => CellValue::Timestamp(meta.created),
            None => CellValue::Missing,
        },
        FileAttr::Modified => match &item.metadata {
            Some(meta) => CellValue::Timestamp(meta.modified),
            None => CellValue::Missing,
        },
        FileAttr::Size => match &item.metadata {
            Some(meta) => CellValue::Number(meta.size as f64),
            None => CellValue::Missing,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::{DocumentRef, Vault, VaultFixture};
    use serde_json::json;

    fn item(fixture: &VaultFixture, path: &str) -> MatchedItem {
        let doc = DocumentRef::new(path);
        let metadata = fixture.vault.metadata(&doc);
        MatchedItem::new(doc, metadata)
    }

    #[test]
    fn link_cell_carries_target_and_label() {
        let fixture = VaultFixture::new().with_document("notes/daily.md", json!({}));
        let cell = render_cell(&item(&fixture, "notes/daily.md"), &Field::file_data(FileAttr::Link));
        assert_eq!(
            cell,
            CellValue::Link {
                target: "notes/daily.md".into(),
                label: "daily".into(),
            }
        );
    }

    #[test]
    fn property_cell_keeps_path_and_raw_value() {
        let fixture = VaultFixture::new().with_document("a.md", json!({"status": "open"}));
        let cell = render_cell(&item(&fixture, "a.md"), &Field::property("status"));
        assert_eq!(
            cell,
            CellValue::Property {
                path: "status".into(),
                value: Some(json!("open")),
            }
        );
    }

    #[test]
    fn absent_property_is_a_valueless_cell() {
        let fixture = VaultFixture::new().with_document("a.md", json!({}));
        let cell = render_cell(&item(&fixture, "a.md"), &Field::property("missing"));
        assert_eq!(
            cell,
            CellValue::Property {
                path: "missing".into(),
                value: None,
            }
        );
    }

    #[test]
    fn metadata_less_item_renders_missing_for_file_stats() {
        let fixture = VaultFixture::new().with_bare_document("bare.md");
        let bare = item(&fixture, "bare.md");
        assert_eq!(
            render_cell(&bare, &Field::file_data(FileAttr::Size)),
            CellValue::Missing
        );
        assert_eq!(
            render_cell(&bare, &Field::file_data(FileAttr::Name)),
            CellValue::Text("bare".into())
        );
        assert_eq!(render_cell(&bare, &Field::tags()), CellValue::TagList(Vec::new()));
    }

    #[test]
    fn embed_cell_passes_the_subpath_through() {
        let fixture = VaultFixture::new().with_document("a.md", json!({}));
        let field = Field::Embed {
            value: "#^quote-1".into(),
            embed_type: EmbedType::Block,
            alias: String::new(),
            col_width: None,
        };
        assert_eq!(
            render_cell(&item(&fixture, "a.md"), &field),
            CellValue::Embed {
                target: "a.md".into(),
                subpath: "#^quote-1".into(),
                embed_type: EmbedType::Block,
            }
        );
    }

    #[test]
    fn rows_have_one_cell_per_field() {
        let fixture = VaultFixture::new()
            .with_tagged_document("a.md", json!({"status": "open"}), &["work"]);
        let fields = vec![
            Field::file_data(FileAttr::Link),
            Field::property("status"),
            Field::tags(),
        ];
        let rows = render_rows(&[item(&fixture, "a.md")], &fields);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cells.len(), 3);
        assert_eq!(rows[0].cells[2], CellValue::TagList(vec!["work".into()]));
    }
}
