//! Walks a confique `Meta` tree: the set of fields the merger resolves.

use confique::meta::{FieldKind, Meta};

/// Collect all leaf key paths of a schema, in declaration order.
///
/// Returns dotted paths like `"track"`, `"promote.from_track"`. Section names
/// (nested structs) are excluded; only leaf fields are returned.
pub fn leaf_keys(meta: &Meta) -> Vec<String> {
    let mut keys = Vec::new();
    collect_keys(meta, "", &mut keys);
    keys
}

fn collect_keys(meta: &Meta, prefix: &str, keys: &mut Vec<String>) {
    for field in meta.fields {
        let dotted = if prefix.is_empty() {
            field.name.to_string()
        } else {
            format!("{prefix}.{}", field.name)
        };
        match &field.kind {
            FieldKind::Leaf { .. } => keys.push(dotted),
            FieldKind::Nested { meta, .. } => collect_keys(meta, &dotted, keys),
        }
    }
}

/// Doc comment lines for a dotted key, or `None` when the schema has no such leaf.
pub fn lookup_doc(meta: &Meta, dotted_key: &str) -> Option<Vec<String>> {
    let segments: Vec<&str> = dotted_key.split('.').collect();
    lookup_doc_recursive(meta, &segments)
}

fn lookup_doc_recursive(meta: &Meta, segments: &[&str]) -> Option<Vec<String>> {
    let (first, rest) = segments.split_first()?;
    let field = meta.fields.iter().find(|f| f.name == *first)?;
    match (&field.kind, rest.is_empty()) {
        (FieldKind::Leaf { .. }, true) => Some(field.doc.iter().map(|s| s.to_string()).collect()),
        (FieldKind::Nested { meta: nested, .. }, false) => lookup_doc_recursive(nested, rest),
        _ => None,
    }
}
