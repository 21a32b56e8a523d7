//! Attribute parsing and id generation.

use std::str::FromStr;

use crate::document::Document;
use crate::dom::NodeId;

/// Parse a boolean attribute value.
///
/// Presence with an empty value counts as `true`, as in HTML.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

pub fn parse_number<T: FromStr>(value: &str) -> Option<T> {
    value.trim().parse().ok()
}

/// Parse an index list: `"0,2"`, `"0 2"` or `"[0, 2]"`.
///
/// Entries that are not indices are skipped.
pub fn parse_index_list(value: &str) -> Vec<usize> {
    value
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect()
}

/// Read `name` from `node` as a boolean.
pub fn bool_attr(doc: &Document, node: NodeId, name: &str) -> Option<bool> {
    doc.attr(node, name).and_then(|v| parse_bool(&v))
}

/// Read `name` from `node` as a number.
pub fn number_attr<T: FromStr>(doc: &Document, node: NodeId, name: &str) -> Option<T> {
    doc.attr(node, name).and_then(|v| parse_number(&v))
}

/// A fresh id of the form `<prefix>-<n>`, unique within the document.
///
/// Counters are per prefix and per document, so ids read naturally
/// (`accordion-trigger-1`, `accordion-trigger-2`) and never collide with ids
/// already present in the markup.
pub fn generate_id(doc: &Document, prefix: &str) -> String {
    loop {
        let candidate = format!("{prefix}-{}", doc.next_id_suffix(prefix));
        if !doc.id_in_use(&candidate) {
            return candidate;
        }
    }
}

/// Return the node's id, assigning a generated one if it has none.
///
/// The flag is `true` when the id was generated here.
pub fn ensure_id(doc: &Document, node: NodeId, prefix: &str) -> (String, bool) {
    match doc.attr(node, "id").filter(|id| !id.is_empty()) {
        Some(id) => (id, false),
        None => {
            let id = generate_id(doc, prefix);
            doc.set_attr(node, "id", &id);
            (id, true)
        }
    }
}
