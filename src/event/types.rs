//! DOM-style events: target, propagation flags and payload.

use std::cell::Cell;
use std::rc::Rc;

use serde_json::Value;

use super::input::{Key, Modifiers, MouseButton, PointerInfo};
use crate::dom::NodeId;

// ---------------------------------------------------------------------------
// EventTarget
// ---------------------------------------------------------------------------

/// Where a listener is attached or an event is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Node(NodeId),
    Document,
    Window,
}

impl From<NodeId> for EventTarget {
    fn from(id: NodeId) -> Self {
        EventTarget::Node(id)
    }
}

impl EventTarget {
    pub fn node(&self) -> Option<NodeId> {
        match self {
            EventTarget::Node(id) => Some(*id),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A dispatched event.
///
/// Events are built with the constructor helpers and passed by reference to
/// [`Document::dispatch_event`](crate::document::Document::dispatch_event). The
/// propagation flags use interior mutability so handlers can call
/// [`prevent_default`](Event::prevent_default) through a shared reference.
#[derive(Debug)]
pub struct Event {
    event_type: String,
    detail: Value,
    bubbles: bool,
    cancelable: bool,
    key: Option<Key>,
    modifiers: Modifiers,
    pointer: Option<PointerInfo>,
    target: Cell<Option<EventTarget>>,
    current_target: Cell<Option<EventTarget>>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
    immediate_stopped: Cell<bool>,
    layer_handled: Cell<bool>,
}

impl Event {
    /// A non-bubbling, non-cancelable event with no payload.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            detail: Value::Null,
            bubbles: false,
            cancelable: false,
            key: None,
            modifiers: Modifiers::NONE,
            pointer: None,
            target: Cell::new(None),
            current_target: Cell::new(None),
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
            immediate_stopped: Cell::new(false),
            layer_handled: Cell::new(false),
        }
    }

    /// A bubbling, cancelable event carrying `detail`.
    pub fn custom(event_type: impl Into<String>, detail: Value) -> Self {
        Self::new(event_type).bubbling().cancelable().with_detail(detail)
    }

    /// A bubbling, cancelable keyboard event (`keydown`, `keyup`).
    pub fn keyboard(event_type: impl Into<String>, key: Key) -> Self {
        let mut event = Self::new(event_type).bubbling().cancelable();
        event.key = Some(key);
        event
    }

    /// A bubbling, cancelable pointer event at page coordinates.
    pub fn pointer(event_type: impl Into<String>, x: f64, y: f64) -> Self {
        let mut event = Self::new(event_type).bubbling().cancelable();
        event.pointer = Some(PointerInfo {
            x,
            y,
            button: MouseButton::Primary,
        });
        event
    }

    pub fn bubbling(mut self) -> Self {
        self.bubbles = true;
        self
    }

    pub fn cancelable(mut self) -> Self {
        self.cancelable = true;
        self
    }

    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = detail;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_button(mut self, button: MouseButton) -> Self {
        if let Some(pointer) = self.pointer.as_mut() {
            pointer.button = button;
        }
        self
    }

    // -- accessors ----------------------------------------------------------

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn detail(&self) -> &Value {
        &self.detail
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn is_cancelable(&self) -> bool {
        self.cancelable
    }

    pub fn key(&self) -> Option<Key> {
        self.key
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn shift_key(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    pub fn pointer_info(&self) -> Option<PointerInfo> {
        self.pointer
    }

    /// The node the event was dispatched at. `None` before dispatch.
    pub fn target(&self) -> Option<EventTarget> {
        self.target.get()
    }

    /// Target as a node id, if dispatched at a node.
    pub fn target_node(&self) -> Option<NodeId> {
        self.target.get().and_then(|t| t.node())
    }

    /// The target whose listeners are currently running.
    pub fn current_target(&self) -> Option<EventTarget> {
        self.current_target.get()
    }

    // -- propagation --------------------------------------------------------

    /// Cancel the default action. Ignored for non-cancelable events.
    pub fn prevent_default(&self) {
        if self.cancelable {
            self.default_prevented.set(true);
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    /// Stop bubbling after the current target's listeners have run.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    /// Stop bubbling and skip the remaining listeners on the current target.
    pub fn stop_immediate_propagation(&self) {
        self.propagation_stopped.set(true);
        self.immediate_stopped.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }

    pub(crate) fn immediate_stopped(&self) -> bool {
        self.immediate_stopped.get()
    }

    pub(crate) fn set_target(&self, target: EventTarget) {
        self.target.set(Some(target));
    }

    pub(crate) fn set_current_target(&self, target: Option<EventTarget>) {
        self.current_target.set(target);
    }

    /// Claim this event for the topmost dismissable layer.
    ///
    /// Returns `false` if a layer already claimed it, so stacked layers sharing a
    /// document listener react once per Escape press or outside click.
    pub(crate) fn claim_for_layer(&self) -> bool {
        !self.layer_handled.replace(true)
    }
}

/// An event listener callback. Identity (`Rc::ptr_eq`) distinguishes listeners.
pub type Handler = Rc<dyn Fn(&Event)>;

/// Wrap a closure as a [`Handler`].
pub fn handler(f: impl Fn(&Event) + 'static) -> Handler {
    Rc::new(f)
}
