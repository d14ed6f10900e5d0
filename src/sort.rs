//! Ordering of the matched items.
//!
//! A custom comparator takes precedence over a builtin field sort when both
//! are present. Sorting is stable, so documents the active comparison
//! considers equal keep their pre-sort relative order within this pass
//! (no stability promise across rescans, since enumeration order itself
//! may change).

use crate::compile::Comparator;
use crate::diag::DiagnosticSink;
use crate::expr::{Bindings, Value};
use crate::matcher::{field_ref_value, ItemBindings, MatchedItem};
use crate::model::Sorter;
use std::cmp::Ordering;

/// Sort items in place according to the sorter.
pub fn order(items: &mut [MatchedItem], sorter: &Sorter, sink: &dyn DiagnosticSink) {
    if let Some(code) = &sorter.custom {
        let comparator = Comparator::compile(code, sink);
        // The comparator owns its direction; `ascending` is not applied
        items.sort_by(|a, b| comparator.compare(&PairBindings { a, b }));
        return;
    }

    let Some(field) = &sorter.builtin else {
        return;
    };
    items.sort_by(|a, b| {
        let ordering = compare_values(&field_ref_value(a, field), &field_ref_value(b, field));
        if sorter.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
}

/// Builtin comparison: numeric when both sides are numbers, otherwise
/// lexicographic on the rendered text. Absent values sort first.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        _ => a.render().cmp(&b.render()),
    }
}

/// Pair environment for custom comparators: the two items are bound under
/// `a` and `b`, with the same heads each item environment exposes.
struct PairBindings<'i> {
    a: &'i MatchedItem,
    b: &'i MatchedItem,
}

impl Bindings for PairBindings<'_> {
    fn resolve(&self, path: &[String]) -> Value {
        let Some((head, rest)) = path.split_first() else {
            return Value::Null;
        };
        let item = match head.as_str() {
            "a" => self.a,
            "b" => self.b,
            _ => return Value::Null,
        };
        ItemBindings { item }.resolve(rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::{NullSink, RecordingSink};
    use crate::model::{FieldRef, FileAttr};
    use crate::vault::{DocumentRef, Vault, VaultFixture};
    use serde_json::json;

    fn items_from(fixture: &VaultFixture) -> Vec<MatchedItem> {
        fixture
            .vault
            .list_documents()
            .into_iter()
            .map(|doc| {
                let metadata = fixture.vault.metadata(&doc);
                MatchedItem::new(doc, metadata)
            })
            .collect()
    }

    fn paths(items: &[MatchedItem]) -> Vec<&str> {
        items.iter().map(|i| i.doc.path.as_str()).collect()
    }

    #[test]
    fn builtin_name_sort_ascending_and_descending() {
        let fixture = VaultFixture::new()
            .with_document("charlie.md", json!({}))
            .with_document("alpha.md", json!({}))
            .with_document("bravo.md", json!({}));
        let mut items = items_from(&fixture);

        order(
            &mut items,
            &Sorter::builtin(FieldRef::FileData(FileAttr::Name), true),
            &NullSink,
        );
        assert_eq!(paths(&items), vec!["alpha.md", "bravo.md", "charlie.md"]);

        order(
            &mut items,
            &Sorter::builtin(FieldRef::FileData(FileAttr::Name), false),
            &NullSink,
        );
        assert_eq!(paths(&items), vec!["charlie.md", "bravo.md", "alpha.md"]);
    }

    #[test]
    fn numeric_property_sorts_numerically() {
        let fixture = VaultFixture::new()
            .with_document("a.md", json!({"priority": 10}))
            .with_document("b.md", json!({"priority": 2}))
            .with_document("c.md", json!({"priority": 1}));
        let mut items = items_from(&fixture);

        order(
            &mut items,
            &Sorter::builtin(FieldRef::Property("priority".into()), true),
            &NullSink,
        );
        // 10 after 2 numerically, not lexicographically
        assert_eq!(paths(&items), vec!["c.md", "b.md", "a.md"]);
    }

    #[test]
    fn missing_values_sort_first() {
        let fixture = VaultFixture::new()
            .with_document("has.md", json!({"due": "2024-05-01"}))
            .with_document("missing.md", json!({}));
        let mut items = items_from(&fixture);

        order(
            &mut items,
            &Sorter::builtin(FieldRef::Property("due".into()), true),
            &NullSink,
        );
        assert_eq!(paths(&items), vec!["missing.md", "has.md"]);
    }

    #[test]
    fn stable_for_equal_keys() {
        let fixture = VaultFixture::new()
            .with_document("first.md", json!({"group": "x"}))
            .with_document("second.md", json!({"group": "x"}))
            .with_document("third.md", json!({"group": "x"}));
        let mut items = items_from(&fixture);

        order(
            &mut items,
            &Sorter::builtin(FieldRef::Property("group".into()), true),
            &NullSink,
        );
        assert_eq!(paths(&items), vec!["first.md", "second.md", "third.md"]);
    }

    #[test]
    fn custom_comparator_wins_over_builtin() {
        let fixture = VaultFixture::new()
            .with_document("alpha.md", json!({"rank": 2}))
            .with_document("zeta.md", json!({"rank": 1}));
        let mut items = items_from(&fixture);

        let sorter = Sorter {
            ascending: true,
            builtin: Some(FieldRef::FileData(FileAttr::Name)),
            custom: Some("a.rank - b.rank".into()),
        };
        order(&mut items, &sorter, &NullSink);
        assert_eq!(paths(&items), vec!["zeta.md", "alpha.md"]);
    }

    #[test]
    fn ascending_flag_does_not_flip_custom_comparators() {
        let fixture = VaultFixture::new()
            .with_document("a.md", json!({"rank": 1}))
            .with_document("b.md", json!({"rank": 2}));
        let mut items = items_from(&fixture);

        let mut sorter = Sorter::custom("a.rank - b.rank");
        sorter.ascending = false;
        order(&mut items, &sorter, &NullSink);
        assert_eq!(paths(&items), vec!["a.md", "b.md"]);
    }

    #[test]
    fn broken_comparator_leaves_order_untouched_and_reports_once() {
        let fixture = VaultFixture::new().with_documents(4);
        let mut items = items_from(&fixture);
        let before = paths(&items)
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();

        let sink = RecordingSink::new();
        order(&mut items, &Sorter::custom("a.name ((("), &sink);
        assert_eq!(paths(&items), before);
        assert_eq!(sink.count(), 1);
    }

    #[test]
    fn metadata_less_items_sort_first_on_metadata_fields() {
        let fixture = VaultFixture::new().with_document("meta.md", json!({}));
        let mut items = items_from(&fixture);
        items.push(MatchedItem::new(DocumentRef::new("bare.md"), None));

        order(
            &mut items,
            &Sorter::builtin(FieldRef::FileData(FileAttr::Size), true),
            &NullSink,
        );
        assert_eq!(paths(&items), vec!["bare.md", "meta.md"]);
    }
}
