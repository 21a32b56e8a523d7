//! Pilot: programmatic interaction with a [`Document`].
//!
//! The `Pilot` simulates what a browser does for user input: it dispatches the
//! DOM events a real gesture produces, in order, and applies the default action
//! (focus on press, focus movement on Tab) unless a listener prevented it.

use crate::document::Document;
use crate::dom::NodeId;
use crate::event::{Event, EventTarget, Key, Modifiers};

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A user-input driver for tests.
///
/// # Examples
///
/// ```ignore
/// use coral_runtime::testing::Pilot;
/// use coral_runtime::event::Key;
///
/// let pilot = Pilot::new(&doc);
/// pilot.click(trigger);
/// pilot.press_key(Key::Escape);
/// ```
pub struct Pilot {
    doc: Document,
}

impl Pilot {
    pub fn new(doc: &Document) -> Self {
        Self { doc: doc.clone() }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    // ── Pointer ──────────────────────────────────────────────────────

    /// Press and release the primary button over the center of `node`, then
    /// dispatch `click`.
    pub fn click(&self, node: NodeId) {
        let (x, y) = self.doc.rect(node).center();
        self.pointer_down(node, x, y);
        self.pointer_up(node, x, y);
        self.doc.dispatch_event(node, &Event::pointer("click", x, y));
    }

    /// `mousedown` at `(x, y)` on `node`. Unless prevented, focus moves to the
    /// nearest focusable inclusive ancestor, or is dropped when there is none.
    pub fn pointer_down(&self, node: NodeId, x: f64, y: f64) {
        let allowed = self.doc.dispatch_event(node, &Event::pointer("mousedown", x, y));
        if allowed {
            self.focus_from_press(node);
        }
    }

    pub fn pointer_move(&self, node: NodeId, x: f64, y: f64) {
        self.doc.dispatch_event(node, &Event::pointer("mousemove", x, y));
    }

    pub fn pointer_up(&self, node: NodeId, x: f64, y: f64) {
        self.doc.dispatch_event(node, &Event::pointer("mouseup", x, y));
    }

    pub fn touch_start(&self, node: NodeId, x: f64, y: f64) {
        let allowed = self.doc.dispatch_event(node, &Event::pointer("touchstart", x, y));
        if allowed {
            self.focus_from_press(node);
        }
    }

    pub fn touch_move(&self, node: NodeId, x: f64, y: f64) {
        self.doc.dispatch_event(node, &Event::pointer("touchmove", x, y));
    }

    pub fn touch_end(&self, node: NodeId, x: f64, y: f64) {
        self.doc.dispatch_event(node, &Event::pointer("touchend", x, y));
    }

    /// `mouseenter` on `node`. Does not bubble.
    pub fn hover(&self, node: NodeId) {
        self.doc.dispatch_event(node, &Event::new("mouseenter"));
    }

    /// `mouseleave` on `node`. Does not bubble.
    pub fn unhover(&self, node: NodeId) {
        self.doc.dispatch_event(node, &Event::new("mouseleave"));
    }

    // ── Keyboard ─────────────────────────────────────────────────────

    /// Press `key` on the focused element (the body when nothing has focus).
    pub fn press_key(&self, key: Key) {
        self.press_key_with(key, Modifiers::NONE);
    }

    /// Press `key` with modifiers held. An unprevented Tab moves focus.
    pub fn press_key_with(&self, key: Key, modifiers: Modifiers) {
        let target = self.doc.active_element().unwrap_or(self.doc.body());
        let allowed = self.key_events(target.into(), key, modifiers);
        if allowed && key == Key::Tab {
            self.doc.focus_next(modifiers.contains(Modifiers::SHIFT));
        }
    }

    /// Dispatch a key press at `node` regardless of focus. No default action.
    pub fn press_key_on(&self, node: NodeId, key: Key) {
        self.key_events(node.into(), key, Modifiers::NONE);
    }

    pub fn tab(&self) {
        self.press_key(Key::Tab);
    }

    pub fn shift_tab(&self) {
        self.press_key_with(Key::Tab, Modifiers::SHIFT);
    }

    /// Press each character of `text` in turn.
    pub fn type_text(&self, text: &str) {
        for ch in text.chars() {
            self.press_key(Key::Char(ch));
        }
    }

    // ── Clock ────────────────────────────────────────────────────────

    /// Advance the document clock, running due timers.
    pub fn advance(&self, ms: u64) {
        self.doc.advance_timers(ms);
    }

    // ── Internals ────────────────────────────────────────────────────

    fn key_events(&self, target: EventTarget, key: Key, modifiers: Modifiers) -> bool {
        let down = Event::keyboard("keydown", key).with_modifiers(modifiers);
        let allowed = self.doc.dispatch_event(target, &down);
        let up = Event::keyboard("keyup", key).with_modifiers(modifiers);
        self.doc.dispatch_event(target, &up);
        allowed
    }

    fn focus_from_press(&self, node: NodeId) {
        let mut current = Some(node);
        while let Some(n) = current {
            if self.doc.is_focusable(n) {
                self.doc.focus(n);
                return;
            }
            current = self.doc.parent(n);
        }
        self.doc.blur();
    }
}
