//! Snapshot helpers.
//!
//! Serialise a DOM subtree to indented HTML text, suitable for `insta` inline
//! snapshots and plain string assertions.

use std::fmt::Write;

use crate::document::Document;
use crate::dom::NodeId;

const INDENT: &str = "  ";

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Serialise `node` and its descendants.
///
/// Attributes appear in insertion order; empty-valued attributes are written bare
/// (`hidden`, not `hidden=""`). Inline styles follow as one `style` attribute.
/// An element without children stays on one line; otherwise each child goes on
/// its own line, indented by two spaces. No trailing newline.
///
/// # Examples
///
/// ```ignore
/// use coral_runtime::testing::snapshot::outer_html;
///
/// let html = outer_html(&doc, switch.element());
/// assert_eq!(html, r#"<button role="switch" aria-checked="false"></button>"#);
/// ```
pub fn outer_html(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, node, 0, &mut out);
    out
}

/// The opening tag of `node` alone, e.g. `<div id="x" hidden>`.
pub fn open_tag(doc: &Document, node: NodeId) -> String {
    doc.with_element(node, |data| {
        let mut tag = format!("<{}", data.tag);
        for (name, value) in &data.attributes {
            if value.is_empty() {
                let _ = write!(tag, " {name}");
            } else {
                let _ = write!(tag, " {name}=\"{}\"", escape(value, true));
            }
        }
        if !data.style.is_empty() {
            let style: Vec<String> = data.style.iter().map(|(k, v)| format!("{k}: {v}")).collect();
            let _ = write!(tag, " style=\"{}\"", escape(&style.join("; "), true));
        }
        tag.push('>');
        tag
    })
    .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn write_node(doc: &Document, node: NodeId, depth: usize, out: &mut String) {
    let Some((tag, text)) = doc.with_element(node, |data| (data.tag.clone(), data.text.clone())) else {
        return;
    };
    let pad = INDENT.repeat(depth);
    let children = doc.children(node);
    out.push_str(&pad);
    out.push_str(&open_tag(doc, node));
    if children.is_empty() {
        out.push_str(&escape(&text, false));
    } else {
        if !text.is_empty() {
            let _ = write!(out, "\n{pad}{INDENT}{}", escape(&text, false));
        }
        for child in children {
            out.push('\n');
            write_node(doc, child, depth + 1, out);
        }
        out.push('\n');
        out.push_str(&pad);
    }
    let _ = write!(out, "</{tag}>");
}

fn escape(text: &str, attribute: bool) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if attribute => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

// ===========================================================================
// Tests
// ===========================================================================
