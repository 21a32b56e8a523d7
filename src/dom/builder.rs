//! `ElementBuilder`: declarative construction of element subtrees.
//!
//! This is the target of the `html!` macro, and usable directly:
//!
//! ```ignore
//! let trigger = ElementBuilder::new("button")
//!     .attr("data-coral-accordion-trigger", "")
//!     .text("Section 1")
//!     .append_to(&doc, item);
//! ```

use super::node::{ElementData, NodeId};
use super::tree::Dom;
use crate::document::Document;

/// A not-yet-inserted element with attributes, text and children.
#[derive(Debug, Clone)]
pub struct ElementBuilder {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<ElementBuilder>,
}

impl ElementBuilder {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute. Pass `""` for boolean attributes.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Append to the element's text content.
    pub fn text(mut self, text: impl AsRef<str>) -> Self {
        self.text.push_str(text.as_ref());
        self
    }

    pub fn child(mut self, child: ElementBuilder) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = ElementBuilder>) -> Self {
        self.children.extend(children);
        self
    }

    /// Insert the subtree into `dom`, detached. Returns the root id.
    pub fn build_in(self, dom: &mut Dom) -> NodeId {
        let mut data = ElementData::new(&self.tag).with_text(self.text);
        for (name, value) in self.attrs {
            data.attributes.insert(name, value);
        }
        let id = dom.create(data);
        for child in self.children {
            let child_id = child.build_in(dom);
            dom.append_child(id, child_id);
        }
        id
    }

    /// Insert the subtree into the document, detached.
    pub fn build(self, doc: &Document) -> NodeId {
        doc.build(self)
    }

    /// Insert the subtree and append it to `parent`.
    pub fn append_to(self, doc: &Document, parent: NodeId) -> NodeId {
        let id = doc.build(self);
        doc.append_child(parent, id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_nested_subtree() {
        let mut dom = Dom::new();
        let root = ElementBuilder::new("ul")
            .attr("role", "list")
            .child(ElementBuilder::new("li").text("one"))
            .children((0..2).map(|i| ElementBuilder::new("li").attr("data-index", i.to_string())))
            .build_in(&mut dom);

        let kids = dom.children(root).to_vec();
        assert_eq!(kids.len(), 3);
        assert_eq!(dom.get(root).unwrap().attr("role"), Some("list"));
        assert_eq!(dom.get(kids[0]).unwrap().text, "one");
        assert_eq!(dom.get(kids[2]).unwrap().attr("data-index"), Some("1"));
        assert_eq!(dom.parent(root), None);
    }

    #[test]
    fn text_accumulates() {
        let mut dom = Dom::new();
        let id = ElementBuilder::new("p").text("a").text("b").build_in(&mut dom);
        assert_eq!(dom.get(id).unwrap().text, "ab");
    }
}
