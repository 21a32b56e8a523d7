//! Focus containment for modal-like widgets.
//!
//! Traps form a stack on the document. Only the topmost trap reacts to Tab, so a
//! dialog opened from inside another dialog owns keyboard focus until it is
//! released, after which the outer trap takes over again.

use std::cell::RefCell;

use crate::document::Document;
use crate::dom::NodeId;
use crate::event::{Event, Key};

#[derive(Debug, Clone, Copy)]
struct TrapEntry {
    container: NodeId,
    restore_to: Option<NodeId>,
}

/// Stack of active focus traps, innermost last.
#[derive(Debug, Default)]
pub struct FocusTrapStack {
    entries: RefCell<Vec<TrapEntry>>,
}

impl FocusTrapStack {
    /// Push a trap. Returns `false` if `container` is already trapped.
    pub(crate) fn push(&self, container: NodeId, restore_to: Option<NodeId>) -> bool {
        let mut entries = self.entries.borrow_mut();
        if entries.iter().any(|e| e.container == container) {
            return false;
        }
        entries.push(TrapEntry {
            container,
            restore_to,
        });
        true
    }

    /// Remove the trap on `container`, wherever it sits in the stack.
    ///
    /// Returns where focus should go back to, which only the topmost trap has. A
    /// trap removed from under another hands its restore target to the trap
    /// above when that one would otherwise restore into `container`.
    pub(crate) fn remove(&self, doc: &Document, container: NodeId) -> Option<NodeId> {
        let mut entries = self.entries.borrow_mut();
        let pos = entries.iter().position(|e| e.container == container)?;
        let removed = entries.remove(pos);
        match entries.get_mut(pos) {
            None => removed.restore_to,
            Some(above) => {
                if above.restore_to.is_some_and(|r| doc.is_within(container, r)) {
                    above.restore_to = removed.restore_to;
                }
                None
            }
        }
    }

    pub fn top(&self) -> Option<NodeId> {
        self.entries.borrow().last().map(|e| e.container)
    }

    pub fn contains(&self, container: NodeId) -> bool {
        self.entries.borrow().iter().any(|e| e.container == container)
    }

    pub fn depth(&self) -> usize {
        self.entries.borrow().len()
    }
}

/// Keydown handling for a trapped `container`.
///
/// Tab on the last tabbable element wraps to the first, Shift+Tab on the first
/// wraps to the last, and focus outside the container is pulled back in. Does
/// nothing unless `container` is the topmost trap.
pub fn handle_trap_keydown(doc: &Document, container: NodeId, event: &Event) {
    if event.key() != Some(Key::Tab) || doc.focus_traps().top() != Some(container) {
        return;
    }
    let tabbable = doc.tabbable_within(container);
    let (Some(&first), Some(&last)) = (tabbable.first(), tabbable.last()) else {
        // Nothing to move to: keep focus where it is.
        event.prevent_default();
        return;
    };

    let active = doc.active_element();
    let inside = active.is_some_and(|a| doc.is_within(container, a));
    let backwards = event.shift_key();

    let destination = match (inside, backwards) {
        (false, false) => Some(first),
        (false, true) => Some(last),
        (true, false) if active == Some(last) => Some(first),
        (true, true) if active == Some(first) => Some(last),
        _ => None,
    };

    if let Some(node) = destination {
        event.prevent_default();
        doc.focus(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementBuilder;
    use crate::event::Modifiers;

    fn setup() -> (Document, NodeId, NodeId, NodeId, NodeId) {
        let doc = Document::new();
        let outside = ElementBuilder::new("button").append_to(&doc, doc.body());
        let container = ElementBuilder::new("div").append_to(&doc, doc.body());
        let first = ElementBuilder::new("button").append_to(&doc, container);
        let last = ElementBuilder::new("input").append_to(&doc, container);
        (doc, outside, container, first, last)
    }

    fn tab(doc: &Document, container: NodeId, shift: bool) -> bool {
        let mut ev = Event::keyboard("keydown", Key::Tab);
        if shift {
            ev = ev.with_modifiers(Modifiers::SHIFT);
        }
        handle_trap_keydown(doc, container, &ev);
        ev.default_prevented()
    }

    #[test]
    fn stack_push_remove() {
        let (doc, outside, container, ..) = setup();
        let stack = doc.focus_traps();
        assert!(stack.push(container, Some(outside)));
        assert!(!stack.push(container, None));
        assert_eq!(stack.top(), Some(container));
        assert_eq!(stack.remove(&doc, container), Some(outside));
        assert_eq!(stack.remove(&doc, container), None);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn removing_a_lower_trap_hands_over_its_restore_target() {
        let (doc, outside, container, first, _last) = setup();
        let inner = ElementBuilder::new("div").append_to(&doc, doc.body());
        let stack = doc.focus_traps();
        stack.push(container, Some(outside));
        stack.push(inner, Some(first));
        assert_eq!(stack.remove(&doc, container), None);
        assert_eq!(stack.remove(&doc, inner), Some(outside));
    }

    #[test]
    fn wraps_at_both_ends() {
        let (doc, _outside, container, first, last) = setup();
        doc.focus_traps().push(container, None);

        doc.focus(last);
        assert!(tab(&doc, container, false));
        assert_eq!(doc.active_element(), Some(first));

        assert!(tab(&doc, container, true));
        assert_eq!(doc.active_element(), Some(last));
    }

    #[test]
    fn middle_of_cycle_is_left_to_default() {
        let (doc, _outside, container, first, _last) = setup();
        doc.focus_traps().push(container, None);
        doc.focus(first);
        assert!(!tab(&doc, container, false));
        assert_eq!(doc.active_element(), Some(first));
    }

    #[test]
    fn pulls_escaped_focus_back() {
        let (doc, outside, container, first, _last) = setup();
        doc.focus_traps().push(container, None);
        doc.focus(outside);
        assert!(tab(&doc, container, false));
        assert_eq!(doc.active_element(), Some(first));
    }

    #[test]
    fn only_topmost_trap_acts() {
        let (doc, _outside, container, _first, last) = setup();
        let inner = ElementBuilder::new("div").append_to(&doc, doc.body());
        doc.focus_traps().push(container, None);
        doc.focus_traps().push(inner, None);
        doc.focus(last);
        assert!(!tab(&doc, container, false));
        assert_eq!(doc.active_element(), Some(last));
    }
}
