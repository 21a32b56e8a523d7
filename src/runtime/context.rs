//! Part discovery and parent-context lookup.
//!
//! Parts are found by their `data-coral-<kind>-<part>` attribute. A widget only owns
//! parts with no other root of the same kind between them and its host, so nested
//! accordions (or dialogs inside dialogs) never steal each other's parts.

use crate::document::Document;
use crate::dom::NodeId;
use crate::error::Error;
use crate::event::WidgetKind;

/// Nearest inclusive ancestor carrying `kind`'s marker attribute.
pub fn closest_root(doc: &Document, node: NodeId, kind: WidgetKind) -> Option<NodeId> {
    doc.dom().closest_with_attr(node, &kind.marker_attribute())
}

/// Parts of the widget rooted at `root`, in document order.
pub fn owned_parts(doc: &Document, root: NodeId, kind: WidgetKind, part: &str) -> Vec<NodeId> {
    let part_attr = kind.part_attribute(part);
    let marker = kind.marker_attribute();
    let dom = doc.dom();
    dom.walk_depth_first(root)
        .into_iter()
        .skip(1)
        .filter(|&n| dom.get(n).is_some_and(|el| el.has_attr(&part_attr)))
        .filter(|&n| {
            dom.ancestors(n)
                .into_iter()
                .take_while(|&a| a != root)
                .all(|a| !dom.get(a).is_some_and(|el| el.has_attr(&marker)))
        })
        .collect()
}

/// Nearest enclosing widget root of `kind`, or a context error naming the part.
pub fn closest_context(doc: &Document, node: NodeId, kind: WidgetKind) -> Result<NodeId, Error> {
    if !doc.contains(node) {
        return Err(Error::UnknownNode(node));
    }
    closest_root(doc, node, kind).ok_or_else(|| Error::MissingContext {
        kind,
        part: describe(doc, node),
    })
}

fn describe(doc: &Document, node: NodeId) -> String {
    let tag = doc.tag(node).unwrap_or_default();
    match doc.attr(node, "id") {
        Some(id) => format!("<{tag} id=\"{id}\">"),
        None => format!("<{tag}>"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementBuilder;

    fn accordion(item_count: usize) -> ElementBuilder {
        ElementBuilder::new("div")
            .attr("data-coral-accordion", "")
            .children((0..item_count).map(|_| {
                ElementBuilder::new("div")
                    .attr("data-coral-accordion-item", "")
                    .child(ElementBuilder::new("button").attr("data-coral-accordion-trigger", ""))
            }))
    }

    #[test]
    fn nested_widgets_keep_their_parts() {
        let doc = Document::new();
        let outer = accordion(2).append_to(&doc, doc.body());
        let first_item = doc.children(outer)[0];
        let inner = accordion(3).append_to(&doc, first_item);

        let outer_items = owned_parts(&doc, outer, WidgetKind::Accordion, "item");
        let inner_items = owned_parts(&doc, inner, WidgetKind::Accordion, "item");
        assert_eq!(outer_items.len(), 2);
        assert_eq!(inner_items.len(), 3);
        assert_eq!(owned_parts(&doc, outer, WidgetKind::Accordion, "trigger").len(), 2);
    }

    #[test]
    fn context_lookup() {
        let doc = Document::new();
        let root = accordion(1).append_to(&doc, doc.body());
        let trigger = owned_parts(&doc, root, WidgetKind::Accordion, "trigger")[0];
        assert_eq!(closest_context(&doc, trigger, WidgetKind::Accordion).unwrap(), root);

        let stray = ElementBuilder::new("button")
            .attr("id", "stray")
            .append_to(&doc, doc.body());
        let err = closest_context(&doc, stray, WidgetKind::Accordion).unwrap_err();
        assert_eq!(
            err.to_string(),
            "<button id=\"stray\"> must be used inside a `accordion` widget"
        );
    }
}
