//! Selector matching and tree queries.
//!
//! Matching walks a selector from right to left: the rightmost compound must match
//! the candidate, then each combinator steps to the parent (`>`) or searches the
//! ancestors (whitespace) for the next compound.

use super::node::{ElementData, NodeId};
use super::selector::{Combinator, CompoundSelector, Selector, SelectorComponent, SelectorList, SelectorPart};
use super::tree::Dom;

/// Check if a single compound selector matches an element.
fn matches_compound(compound: &CompoundSelector, data: &ElementData) -> bool {
    compound.components.iter().all(|component| match component {
        SelectorComponent::Type(tag) => data.tag == *tag,
        SelectorComponent::Universal => true,
        SelectorComponent::Class(class) => data.has_class(class),
        SelectorComponent::Id(id) => data.id() == Some(id.as_str()),
        SelectorComponent::Attribute { name, value } => match value {
            Some(expected) => data.attr(name) == Some(expected.as_str()),
            None => data.has_attr(name),
        },
    })
}

/// Check if a complex selector matches `node_id`.
fn matches_selector(selector: &Selector, node_id: NodeId, dom: &Dom) -> bool {
    let parts = &selector.parts;
    let Some(SelectorPart::Compound(last)) = parts.last() else {
        return false;
    };
    match dom.get(node_id) {
        Some(data) if matches_compound(last, data) => {}
        _ => return false,
    }

    let mut part_idx = parts.len() - 1;
    let mut current_node = node_id;

    // Walk leftward through combinator + compound pairs.
    while part_idx >= 2 {
        let SelectorPart::Combinator(combinator) = &parts[part_idx - 1] else {
            return false;
        };
        let SelectorPart::Compound(compound) = &parts[part_idx - 2] else {
            return false;
        };
        part_idx -= 2;

        match combinator {
            Combinator::Child => {
                let Some(parent_id) = dom.parent(current_node) else {
                    return false;
                };
                match dom.get(parent_id) {
                    Some(parent) if matches_compound(compound, parent) => current_node = parent_id,
                    _ => return false,
                }
            }
            Combinator::Descendant => {
                let found = dom.ancestors(current_node).into_iter().find(|&ancestor| {
                    dom.get(ancestor)
                        .is_some_and(|data| matches_compound(compound, data))
                });
                match found {
                    Some(ancestor) => current_node = ancestor,
                    None => return false,
                }
            }
        }
    }

    part_idx == 0
}

impl SelectorList {
    /// Whether any selector in the list matches `node`.
    pub fn matches(&self, node: NodeId, dom: &Dom) -> bool {
        self.selectors
            .iter()
            .any(|selector| matches_selector(selector, node, dom))
    }
}

impl Dom {
    /// Whether `node` matches the selector list.
    pub fn matches(&self, node: NodeId, selectors: &SelectorList) -> bool {
        selectors.matches(node, self)
    }

    /// All descendants of `scope` (excluding `scope`) matching the selector, in
    /// document order.
    pub fn query_all(&self, scope: NodeId, selectors: &SelectorList) -> Vec<NodeId> {
        self.walk_depth_first(scope)
            .into_iter()
            .skip(1)
            .filter(|&node| selectors.matches(node, self))
            .collect()
    }

    /// First descendant of `scope` matching the selector, in document order.
    pub fn query_first(&self, scope: NodeId, selectors: &SelectorList) -> Option<NodeId> {
        self.walk_depth_first(scope)
            .into_iter()
            .skip(1)
            .find(|&node| selectors.matches(node, self))
    }

    /// Nearest inclusive ancestor of `node` matching the selector.
    pub fn closest(&self, node: NodeId, selectors: &SelectorList) -> Option<NodeId> {
        std::iter::once(node)
            .chain(self.ancestors(node))
            .find(|&candidate| selectors.matches(candidate, self))
    }

    /// First node under `scope` (inclusive) whose `id` attribute equals `id`.
    pub fn find_by_id(&self, scope: NodeId, id: &str) -> Option<NodeId> {
        self.walk_depth_first(scope)
            .into_iter()
            .find(|&node| self.get(node).is_some_and(|data| data.id() == Some(id)))
    }

    /// Any node in the arena, attached or not, whose `id` attribute equals `id`.
    ///
    /// Iterates in slotmap insertion order, which is deterministic but not tree-order.
    pub fn find_any_by_id(&self, id: &str) -> Option<NodeId> {
        self.iter()
            .find(|(_, data)| data.id() == Some(id))
            .map(|(node, _)| node)
    }

    /// Nearest inclusive ancestor carrying `attribute`.
    pub fn closest_with_attr(&self, node: NodeId, attribute: &str) -> Option<NodeId> {
        std::iter::once(node)
            .chain(self.ancestors(node))
            .find(|&candidate| self.get(candidate).is_some_and(|data| data.has_attr(attribute)))
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::node::ElementData;
    use crate::dom::selector::parse_selector_list;
    use crate::dom::tree::Dom;
    use crate::dom::NodeId;

    /// Build a test tree for queries:
    /// ```text
    ///   body
    ///    └─ div [data-coral-accordion] #acc
    ///        ├─ section.item.open [data-index=0]
    ///        │    └─ button.trigger
    ///        └─ section.item [data-index=1]
    ///             └─ button.trigger [disabled]
    /// ```
    fn build() -> (Dom, NodeId, NodeId, NodeId, NodeId, NodeId, NodeId) {
        let mut dom = Dom::new();
        let body = dom.create(ElementData::new("body"));
        let acc = dom.create(
            ElementData::new("div")
                .with_attr("id", "acc")
                .with_attr("data-coral-accordion", ""),
        );
        let item0 = dom.create(
            ElementData::new("section")
                .with_attr("class", "item open")
                .with_attr("data-index", "0"),
        );
        let item1 = dom.create(
            ElementData::new("section")
                .with_attr("class", "item")
                .with_attr("data-index", "1"),
        );
        let t0 = dom.create(ElementData::new("button").with_attr("class", "trigger"));
        let t1 = dom.create(
            ElementData::new("button")
                .with_attr("class", "trigger")
                .with_attr("disabled", ""),
        );
        dom.append_child(body, acc);
        dom.append_child(acc, item0);
        dom.append_child(acc, item1);
        dom.append_child(item0, t0);
        dom.append_child(item1, t1);
        (dom, body, acc, item0, item1, t0, t1)
    }

    fn sel(s: &str) -> crate::dom::selector::SelectorList {
        parse_selector_list(s).unwrap()
    }

    #[test]
    fn type_class_id_attribute() {
        let (dom, _body, acc, item0, item1, t0, _t1) = build();
        assert!(dom.matches(acc, &sel("#acc")));
        assert!(dom.matches(acc, &sel("[data-coral-accordion]")));
        assert!(dom.matches(item0, &sel("section.item.open")));
        assert!(!dom.matches(item1, &sel("section.item.open")));
        assert!(dom.matches(item1, &sel("[data-index=1]")));
        assert!(dom.matches(t0, &sel("*")));
    }

    #[test]
    fn descendant_and_child() {
        let (dom, _body, _acc, _item0, _item1, t0, _t1) = build();
        assert!(dom.matches(t0, &sel("#acc button")));
        assert!(dom.matches(t0, &sel("body .trigger")));
        assert!(!dom.matches(t0, &sel("#acc > button")));
        assert!(dom.matches(t0, &sel("#acc > .item > button")));
        assert!(dom.matches(t0, &sel(".open button")));
        assert!(!dom.matches(t0, &sel("[data-index=1] button")));
    }

    #[test]
    fn query_all_in_document_order() {
        let (dom, body, acc, item0, item1, t0, t1) = build();
        assert_eq!(dom.query_all(body, &sel(".trigger")), vec![t0, t1]);
        assert_eq!(dom.query_all(body, &sel("button[disabled], .open")), vec![item0, t1]);
        // Scope itself is excluded.
        assert!(dom.query_all(acc, &sel("#acc")).is_empty());
        assert_eq!(dom.query_first(acc, &sel("section")), Some(item0));
        let _ = item1;
    }

    #[test]
    fn closest_is_inclusive() {
        let (dom, _body, acc, item0, _item1, t0, _t1) = build();
        assert_eq!(dom.closest(t0, &sel("section")), Some(item0));
        assert_eq!(dom.closest(acc, &sel("div")), Some(acc));
        assert_eq!(dom.closest(t0, &sel("table")), None);
        assert_eq!(dom.closest_with_attr(t0, "data-coral-accordion"), Some(acc));
    }

    #[test]
    fn find_by_id() {
        let (dom, body, acc, ..) = build();
        assert_eq!(dom.find_by_id(body, "acc"), Some(acc));
        assert_eq!(dom.find_by_id(body, "nope"), None);
    }
}
