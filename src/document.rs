//! Document: the host environment widgets run in.
//!
//! [`Document`] owns the element tree, the listener table, keyboard focus, the
//! dismissable-layer and focus-trap stacks, the scroll lock and a virtual clock.
//! It is a cheap `Clone` handle; all clones refer to the same document.
//!
//! Everything is single-threaded. Methods take `&self` and borrow internal state
//! only for the duration of the call, never across a listener or timer callback,
//! so callbacks are free to call back into the document.

use std::cell::{Cell, Ref, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::dom::selector::{parse_selector_list, SelectorError};
use crate::dom::{Dom, ElementBuilder, ElementData, NodeId, Rect};
use crate::event::names::WidgetKind;
use crate::event::{Event, EventTarget, Handler, ListenerId, ListenerOptions, ListenerTable};
use crate::runtime::focus_trap::FocusTrapStack;
use crate::runtime::scroll_lock::ScrollLock;
use crate::runtime::widget::AnyWidget;
use crate::runtime::{Component, Widget};
use crate::timer::{TimerId, TimerQueue};

/// Tags that take focus without a `tabindex`.
const NATIVELY_FOCUSABLE: &[&str] = &["button", "input", "select", "textarea"];

/// Tags whose `disabled` attribute removes them from focus.
const DISABLEABLE: &[&str] = &["button", "input", "select", "textarea", "fieldset"];

struct DocumentInner {
    dom: RefCell<Dom>,
    html: NodeId,
    body: NodeId,
    listeners: RefCell<ListenerTable>,
    timers: RefCell<TimerQueue>,
    id_counters: RefCell<HashMap<String, u64>>,
    active: Cell<Option<NodeId>>,
    layers: RefCell<Vec<NodeId>>,
    focus_traps: FocusTrapStack,
    scroll_lock: ScrollLock,
    instances: RefCell<HashMap<(NodeId, WidgetKind), Box<dyn AnyWidget>>>,
}

/// Shared handle to a document.
#[derive(Clone)]
pub struct Document {
    inner: Rc<DocumentInner>,
}

/// Non-owning document handle.
#[derive(Clone)]
pub struct WeakDocument(Weak<DocumentInner>);

impl WeakDocument {
    pub fn upgrade(&self) -> Option<Document> {
        self.0.upgrade().map(|inner| Document { inner })
    }
}

impl Document {
    /// Create a document containing `<html><body></body></html>`.
    pub fn new() -> Self {
        let mut dom = Dom::new();
        let html = dom.create(ElementData::new("html"));
        let body = dom.create(ElementData::new("body"));
        dom.append_child(html, body);
        Self {
            inner: Rc::new(DocumentInner {
                dom: RefCell::new(dom),
                html,
                body,
                listeners: RefCell::new(ListenerTable::new()),
                timers: RefCell::new(TimerQueue::new()),
                id_counters: RefCell::new(HashMap::new()),
                active: Cell::new(None),
                layers: RefCell::new(Vec::new()),
                focus_traps: FocusTrapStack::default(),
                scroll_lock: ScrollLock::default(),
                instances: RefCell::new(HashMap::new()),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakDocument {
        WeakDocument(Rc::downgrade(&self.inner))
    }

    /// Whether two handles refer to the same document.
    pub fn ptr_eq(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn html(&self) -> NodeId {
        self.inner.html
    }

    pub fn body(&self) -> NodeId {
        self.inner.body
    }

    /// Read access to the element tree.
    ///
    /// Drop the guard before calling anything that mutates the document.
    pub fn dom(&self) -> Ref<'_, Dom> {
        self.inner.dom.borrow()
    }

    fn with_dom_mut<R>(&self, f: impl FnOnce(&mut Dom) -> R) -> R {
        f(&mut self.inner.dom.borrow_mut())
    }

    // -----------------------------------------------------------------------
    // Tree
    // -----------------------------------------------------------------------

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.with_dom_mut(|dom| dom.create(ElementData::new(tag)))
    }

    /// Insert a builder's subtree, detached.
    pub fn build(&self, builder: ElementBuilder) -> NodeId {
        self.with_dom_mut(|dom| builder.build_in(dom))
    }

    /// Append `child` to `parent`, moving it if it is already attached elsewhere.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> bool {
        self.with_dom_mut(|dom| dom.append_child(parent, child))
    }

    /// Detach a subtree from its parent, keeping it alive.
    pub fn detach(&self, node: NodeId) -> bool {
        let detached = self.with_dom_mut(|dom| dom.detach(node));
        if detached {
            self.drop_focus_inside(node);
        }
        detached
    }

    /// Remove a subtree for good, together with every listener attached to it.
    pub fn remove_node(&self, node: NodeId) -> bool {
        self.drop_focus_inside(node);
        let removed = self.with_dom_mut(|dom| dom.remove(node));
        if removed.is_empty() {
            return false;
        }
        let purged = self.inner.listeners.borrow_mut().purge_nodes(&removed);
        self.inner.layers.borrow_mut().retain(|n| !removed.contains(n));
        tracing::trace!(nodes = removed.len(), listeners = purged, "removed subtree");
        true
    }

    fn drop_focus_inside(&self, node: NodeId) {
        if let Some(active) = self.inner.active.get() {
            if self.is_within(node, active) {
                self.inner.active.set(None);
            }
        }
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.dom().contains(node)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.dom().parent(node)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.dom().children(node).to_vec()
    }

    /// Whether the node is attached under `<html>`.
    pub fn is_connected(&self, node: NodeId) -> bool {
        let dom = self.dom();
        dom.contains(node) && dom.root_of(node) == self.inner.html
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    pub fn is_within(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.dom().is_inclusive_ancestor(ancestor, node)
    }

    /// Number of observable DOM changes so far.
    pub fn mutation_count(&self) -> u64 {
        self.dom().mutation_count()
    }

    // -----------------------------------------------------------------------
    // Attributes, text, style, geometry
    // -----------------------------------------------------------------------

    /// Run `f` against a node's data.
    pub fn with_element<R>(&self, node: NodeId, f: impl FnOnce(&ElementData) -> R) -> Option<R> {
        self.dom().get(node).map(f)
    }

    pub fn tag(&self, node: NodeId) -> Option<String> {
        self.with_element(node, |el| el.tag.clone())
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.with_element(node, |el| el.attr(name).map(str::to_owned)).flatten()
    }

    pub fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.with_element(node, |el| el.has_attr(name)).unwrap_or(false)
    }

    /// Set an attribute. Returns `true` if the value changed.
    pub fn set_attr(&self, node: NodeId, name: &str, value: impl AsRef<str>) -> bool {
        self.with_dom_mut(|dom| dom.set_attr(node, name, value.as_ref()))
    }

    pub fn remove_attr(&self, node: NodeId, name: &str) -> bool {
        self.with_dom_mut(|dom| dom.remove_attr(node, name))
    }

    /// Add (as an empty boolean attribute) or remove `name`.
    pub fn toggle_attr(&self, node: NodeId, name: &str, on: bool) -> bool {
        if on {
            self.set_attr(node, name, "")
        } else {
            self.remove_attr(node, name)
        }
    }

    /// Write `"true"` or `"false"`, as ARIA state attributes expect.
    pub fn set_bool_attr(&self, node: NodeId, name: &str, value: bool) -> bool {
        self.set_attr(node, name, if value { "true" } else { "false" })
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.with_element(node, |el| el.has_class(class)).unwrap_or(false)
    }

    pub fn text(&self, node: NodeId) -> String {
        self.with_element(node, |el| el.text.clone()).unwrap_or_default()
    }

    pub fn set_text(&self, node: NodeId, text: &str) -> bool {
        self.with_dom_mut(|dom| dom.set_text(node, text))
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.with_element(node, |el| el.style(property).map(str::to_owned))
            .flatten()
    }

    pub fn set_style(&self, node: NodeId, property: &str, value: impl AsRef<str>) -> bool {
        self.with_dom_mut(|dom| dom.set_style(node, property, value.as_ref()))
    }

    pub fn remove_style(&self, node: NodeId, property: &str) -> bool {
        self.with_dom_mut(|dom| dom.remove_style(node, property))
    }

    pub fn rect(&self, node: NodeId) -> Rect {
        self.with_element(node, |el| el.rect).unwrap_or_default()
    }

    pub fn set_rect(&self, node: NodeId, rect: Rect) {
        self.with_dom_mut(|dom| dom.set_rect(node, rect));
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// First connected element matching `selector`, in document order.
    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        self.query_selector_within(self.inner.html, selector)
    }

    /// Every connected element matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        self.query_selector_all_within(self.inner.html, selector)
    }

    pub fn query_selector_within(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        let list = parse_selector_list(selector)?;
        Ok(self.dom().query_first(scope, &list))
    }

    pub fn query_selector_all_within(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        let list = parse_selector_list(selector)?;
        Ok(self.dom().query_all(scope, &list))
    }

    pub fn matches(&self, node: NodeId, selector: &str) -> Result<bool, SelectorError> {
        let list = parse_selector_list(selector)?;
        Ok(self.dom().matches(node, &list))
    }

    pub fn closest(&self, node: NodeId, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        let list = parse_selector_list(selector)?;
        Ok(self.dom().closest(node, &list))
    }

    /// Connected element with the given `id`.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.dom().find_by_id(self.inner.html, id)
    }

    /// Whether any element, attached or not, uses `id`.
    pub fn id_in_use(&self, id: &str) -> bool {
        self.dom().find_any_by_id(id).is_some()
    }

    /// Next value of the per-prefix id counter (starting at 1).
    pub(crate) fn next_id_suffix(&self, prefix: &str) -> u64 {
        let mut counters = self.inner.id_counters.borrow_mut();
        let counter = counters.entry(prefix.to_owned()).or_insert(0);
        *counter += 1;
        *counter
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Register a listener. Re-registering the same handler for the same target
    /// and type returns the existing id.
    pub fn add_event_listener(
        &self,
        target: impl Into<EventTarget>,
        event_type: &str,
        handler: Handler,
        options: ListenerOptions,
    ) -> ListenerId {
        self.inner
            .listeners
            .borrow_mut()
            .add(target.into(), event_type, handler, options)
    }

    /// Unregister by target, type and handler identity.
    pub fn remove_event_listener(&self, target: impl Into<EventTarget>, event_type: &str, handler: &Handler) -> bool {
        self.inner
            .listeners
            .borrow_mut()
            .remove(target.into(), event_type, handler)
            .is_some()
    }

    /// Unregister by id. Returns `false` if it was already gone.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.listeners.borrow_mut().remove_id(id)
    }

    pub fn has_listener(&self, id: ListenerId) -> bool {
        self.inner.listeners.borrow().contains(id)
    }

    /// Listeners attached to `target` (any type).
    pub fn listener_count(&self, target: impl Into<EventTarget>) -> usize {
        self.inner.listeners.borrow().count_for(target.into())
    }

    /// Listeners attached to `target` for one event type.
    pub fn listener_count_for(&self, target: impl Into<EventTarget>, event_type: &str) -> usize {
        self.inner
            .listeners
            .borrow()
            .count_for_type(target.into(), event_type)
    }

    /// Total listeners in the document.
    pub fn total_listeners(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Dispatch `event` at `target`.
    ///
    /// Listeners on the target run first; bubbling events then visit each
    /// ancestor, then the document and the window when the target is connected.
    /// A listener removed by an earlier listener in the same dispatch does not
    /// run. Returns `false` if the default action was prevented.
    pub fn dispatch_event(&self, target: impl Into<EventTarget>, event: &Event) -> bool {
        let target = target.into();
        event.set_target(target);

        for current in self.propagation_path(target, event.bubbles()) {
            event.set_current_target(Some(current));
            let invocations = self
                .inner
                .listeners
                .borrow()
                .invocations(current, event.event_type());
            for invocation in invocations {
                {
                    let mut listeners = self.inner.listeners.borrow_mut();
                    if !listeners.contains(invocation.id) {
                        continue;
                    }
                    if invocation.once {
                        listeners.remove_id(invocation.id);
                    }
                }
                (invocation.handler)(event);
                if event.immediate_stopped() {
                    break;
                }
            }
            if event.propagation_stopped() {
                break;
            }
        }

        event.set_current_target(None);
        !event.default_prevented()
    }

    /// Compute the propagation path from `target` outward.
    fn propagation_path(&self, target: EventTarget, bubbles: bool) -> Vec<EventTarget> {
        match target {
            EventTarget::Node(node) => {
                let dom = self.dom();
                if !dom.contains(node) {
                    return Vec::new();
                }
                if !bubbles {
                    return vec![target];
                }
                let ancestors = dom.ancestors(node);
                let connected = ancestors.last().copied().unwrap_or(node) == self.inner.html;
                let mut path = vec![target];
                path.extend(ancestors.into_iter().map(EventTarget::Node));
                if connected {
                    path.push(EventTarget::Document);
                    path.push(EventTarget::Window);
                }
                path
            }
            EventTarget::Document if bubbles => vec![EventTarget::Document, EventTarget::Window],
            EventTarget::Document => vec![EventTarget::Document],
            EventTarget::Window => vec![EventTarget::Window],
        }
    }

    // -----------------------------------------------------------------------
    // Focus
    // -----------------------------------------------------------------------

    /// The focused element, if any.
    pub fn active_element(&self) -> Option<NodeId> {
        self.inner.active.get()
    }

    /// Whether `node` can receive focus: connected, rendered, enabled, and either
    /// natively focusable or carrying a `tabindex`.
    pub fn is_focusable(&self, node: NodeId) -> bool {
        if !self.is_connected(node) {
            return false;
        }
        let dom = self.dom();
        let Some(el) = dom.get(node) else {
            return false;
        };
        if el.tag == "input" && el.attr("type") == Some("hidden") {
            return false;
        }
        if el.has_attr("disabled") && DISABLEABLE.contains(&el.tag.as_str()) {
            return false;
        }
        let hidden = std::iter::once(node).chain(dom.ancestors(node)).any(|n| {
            dom.get(n).is_some_and(|a| {
                a.has_attr("hidden") || a.has_attr("inert") || a.style("display") == Some("none")
            })
        });
        if hidden {
            return false;
        }
        el.has_attr("tabindex") || NATIVELY_FOCUSABLE.contains(&el.tag.as_str())
    }

    /// Whether `node` takes part in sequential (Tab) navigation.
    pub fn is_tabbable(&self, node: NodeId) -> bool {
        let negative_tabindex = self
            .attr(node, "tabindex")
            .and_then(|t| t.trim().parse::<i32>().ok())
            .is_some_and(|t| t < 0);
        !negative_tabindex && self.is_focusable(node)
    }

    /// Tabbable descendants of `container`, in document order.
    pub fn tabbable_within(&self, container: NodeId) -> Vec<NodeId> {
        let candidates: Vec<NodeId> = self.dom().walk_depth_first(container).into_iter().skip(1).collect();
        candidates.into_iter().filter(|&n| self.is_tabbable(n)).collect()
    }

    /// Move focus to `node`. Returns `false` if it cannot take focus.
    ///
    /// Fires `blur`/`focusout` on the previous element, then `focus`/`focusin`.
    pub fn focus(&self, node: NodeId) -> bool {
        if !self.is_focusable(node) {
            return false;
        }
        let previous = self.inner.active.get();
        if previous == Some(node) {
            return true;
        }
        self.inner.active.set(Some(node));
        if let Some(prev) = previous {
            self.dispatch_event(prev, &Event::new("blur"));
            self.dispatch_event(prev, &Event::new("focusout").bubbling());
        }
        self.dispatch_event(node, &Event::new("focus"));
        self.dispatch_event(node, &Event::new("focusin").bubbling());
        true
    }

    /// Clear focus.
    pub fn blur(&self) {
        if let Some(prev) = self.inner.active.take() {
            self.dispatch_event(prev, &Event::new("blur"));
            self.dispatch_event(prev, &Event::new("focusout").bubbling());
        }
    }

    /// Move focus to the next (or previous) tabbable element of the document,
    /// wrapping around. Used for default Tab handling.
    pub fn focus_next(&self, backwards: bool) -> Option<NodeId> {
        let chain = self.tabbable_within(self.inner.html);
        if chain.is_empty() {
            return None;
        }
        let current = self
            .inner
            .active
            .get()
            .and_then(|a| chain.iter().position(|&n| n == a));
        let len = chain.len();
        let index = match (current, backwards) {
            (None, false) => 0,
            (None, true) => len - 1,
            (Some(i), false) => (i + 1) % len,
            (Some(i), true) => (i + len - 1) % len,
        };
        let next = chain[index];
        self.focus(next);
        Some(next)
    }

    pub(crate) fn focus_traps(&self) -> &FocusTrapStack {
        &self.inner.focus_traps
    }

    /// Number of active focus traps.
    pub fn focus_trap_depth(&self) -> usize {
        self.inner.focus_traps.depth()
    }

    // -----------------------------------------------------------------------
    // Dismissable layers
    // -----------------------------------------------------------------------

    /// Push `node` as the topmost dismissable layer (moving it if present).
    pub fn push_layer(&self, node: NodeId) {
        let mut layers = self.inner.layers.borrow_mut();
        layers.retain(|&n| n != node);
        layers.push(node);
    }

    pub fn remove_layer(&self, node: NodeId) -> bool {
        let mut layers = self.inner.layers.borrow_mut();
        let before = layers.len();
        layers.retain(|&n| n != node);
        layers.len() != before
    }

    pub fn top_layer(&self) -> Option<NodeId> {
        self.inner.layers.borrow().last().copied()
    }

    pub fn layer_count(&self) -> usize {
        self.inner.layers.borrow().len()
    }

    // -----------------------------------------------------------------------
    // Scroll lock plumbing (public API lives in runtime::scroll_lock)
    // -----------------------------------------------------------------------

    pub(crate) fn scroll_lock(&self) -> &ScrollLock {
        &self.inner.scroll_lock
    }

    pub(crate) fn with_scroll_lock<R>(&self, f: impl FnOnce(&ScrollLock, &mut Dom, NodeId) -> R) -> R {
        let mut dom = self.inner.dom.borrow_mut();
        f(&self.inner.scroll_lock, &mut dom, self.inner.body)
    }

    // -----------------------------------------------------------------------
    // Widget instances
    // -----------------------------------------------------------------------

    /// Keep `widget` alive as the instance of its kind on `node`, replacing any
    /// previous registration.
    pub(crate) fn register_instance(&self, node: NodeId, kind: WidgetKind, widget: Box<dyn AnyWidget>) {
        let previous = self.inner.instances.borrow_mut().insert((node, kind), widget);
        drop(previous);
    }

    /// Drop the registration if it still belongs to the instance identified by `key`.
    pub(crate) fn unregister_instance(&self, node: NodeId, kind: WidgetKind, key: usize) -> bool {
        let removed = {
            let mut instances = self.inner.instances.borrow_mut();
            match instances.get(&(node, kind)) {
                Some(existing) if existing.instance_key() == key => instances.remove(&(node, kind)),
                _ => None,
            }
        };
        removed.is_some()
    }

    /// Whether `node` currently hosts a live widget of `kind`.
    pub fn has_instance(&self, node: NodeId, kind: WidgetKind) -> bool {
        self.inner.instances.borrow().contains_key(&(node, kind))
    }

    /// The live `C` instance on `node`, if any.
    pub fn instance<C: Component>(&self, node: NodeId) -> Option<Widget<C>> {
        self.inner
            .instances
            .borrow()
            .get(&(node, C::KIND))
            .and_then(|w| w.as_any().downcast_ref::<Widget<C>>())
            .cloned()
    }

    pub fn instance_count(&self) -> usize {
        self.inner.instances.borrow().len()
    }

    /// Destroy every live widget. Returns how many were destroyed.
    pub fn destroy_all(&self) -> usize {
        let keys: Vec<(NodeId, WidgetKind)> = self.inner.instances.borrow().keys().copied().collect();
        let mut destroyed = 0;
        for key in keys {
            let widget = self.inner.instances.borrow_mut().remove(&key);
            if let Some(widget) = widget {
                widget.destroy();
                destroyed += 1;
            }
        }
        destroyed
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.inner.timers.borrow().now()
    }

    /// Run `callback` once, `delay_ms` from now.
    pub fn set_timeout(&self, delay_ms: u64, callback: impl FnOnce() + 'static) -> TimerId {
        self.inner
            .timers
            .borrow_mut()
            .schedule(delay_ms, Box::new(callback))
    }

    pub fn clear_timeout(&self, id: TimerId) -> bool {
        self.inner.timers.borrow_mut().cancel(id)
    }

    pub fn timer_pending(&self, id: TimerId) -> bool {
        self.inner.timers.borrow().is_pending(id)
    }

    pub fn pending_timers(&self) -> usize {
        self.inner.timers.borrow().len()
    }

    /// Advance the clock by `ms`, running every timer that falls due on the way in
    /// due-time order. Timers scheduled by callbacks run too if they fall inside
    /// the window.
    pub fn advance_timers(&self, ms: u64) {
        let deadline = self.now().saturating_add(ms);
        loop {
            let next = self.inner.timers.borrow_mut().pop_due(deadline);
            match next {
                Some(callback) => callback(),
                None => break,
            }
        }
        self.inner.timers.borrow_mut().advance_to(deadline);
    }

    /// Drive the virtual clock from real (tokio) time until no timers remain.
    ///
    /// Each pending timer is awaited with `tokio::time::sleep`, so under a paused
    /// tokio clock this completes instantly while preserving ordering.
    pub async fn drive_timers(&self) {
        loop {
            let next_due = self.inner.timers.borrow().next_due();
            let Some(due) = next_due else {
                break;
            };
            let wait = due.saturating_sub(self.now());
            tokio::time::sleep(Duration::from_millis(wait)).await;
            self.advance_timers(wait);
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.dom().len())
            .field("listeners", &self.total_listeners())
            .field("now", &self.now())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::handler;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn log() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Handler) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log2 = log.clone();
        let make = move |label: &str| -> Handler {
            let log = log2.clone();
            let label = label.to_owned();
            handler(move |_| log.borrow_mut().push(label.clone()))
        };
        (log, make)
    }

    // ── Tree ─────────────────────────────────────────────────────────

    #[test]
    fn new_document_has_html_and_body() {
        let doc = Document::new();
        assert_eq!(doc.parent(doc.body()), Some(doc.html()));
        assert!(doc.is_connected(doc.body()));
    }

    #[test]
    fn detached_nodes_are_not_connected() {
        let doc = Document::new();
        let div = doc.create_element("div");
        assert!(!doc.is_connected(div));
        doc.append_child(doc.body(), div);
        assert!(doc.is_connected(div));
        doc.detach(div);
        assert!(!doc.is_connected(div));
        assert!(doc.contains(div));
    }

    #[test]
    fn remove_node_purges_listeners() {
        let doc = Document::new();
        let div = ElementBuilder::new("div")
            .child(ElementBuilder::new("span"))
            .append_to(&doc, doc.body());
        let span = doc.children(div)[0];
        doc.add_event_listener(span, "click", handler(|_| {}), ListenerOptions::default());
        doc.add_event_listener(div, "click", handler(|_| {}), ListenerOptions::default());
        assert_eq!(doc.total_listeners(), 2);
        assert!(doc.remove_node(div));
        assert_eq!(doc.total_listeners(), 0);
        assert!(!doc.contains(span));
    }

    #[test]
    fn toggle_and_bool_attrs() {
        let doc = Document::new();
        let div = doc.create_element("div");
        doc.toggle_attr(div, "hidden", true);
        assert_eq!(doc.attr(div, "hidden").as_deref(), Some(""));
        doc.toggle_attr(div, "hidden", false);
        assert!(!doc.has_attr(div, "hidden"));
        doc.set_bool_attr(div, "aria-expanded", true);
        assert_eq!(doc.attr(div, "aria-expanded").as_deref(), Some("true"));
    }

    #[test]
    fn queries() {
        let doc = Document::new();
        let a = ElementBuilder::new("div").attr("id", "a").attr("data-x", "").append_to(&doc, doc.body());
        let detached = ElementBuilder::new("div").attr("id", "b").attr("data-x", "").build(&doc);
        assert_eq!(doc.query_selector_all("[data-x]").unwrap(), vec![a]);
        assert_eq!(doc.get_element_by_id("a"), Some(a));
        assert_eq!(doc.get_element_by_id("b"), None);
        assert!(doc.id_in_use("b"));
        assert!(doc.matches(detached, "#b").unwrap());
        assert!(doc.query_selector("div:hover").is_err());
    }

    // ── Events ───────────────────────────────────────────────────────

    #[test]
    fn bubbles_to_document_and_window() {
        let doc = Document::new();
        let (log, make) = log();
        let div = ElementBuilder::new("div").append_to(&doc, doc.body());
        doc.add_event_listener(div, "click", make("div"), ListenerOptions::default());
        doc.add_event_listener(doc.body(), "click", make("body"), ListenerOptions::default());
        doc.add_event_listener(EventTarget::Document, "click", make("document"), ListenerOptions::default());
        doc.add_event_listener(EventTarget::Window, "click", make("window"), ListenerOptions::default());

        doc.dispatch_event(div, &Event::new("click").bubbling());
        assert_eq!(*log.borrow(), vec!["div", "body", "document", "window"]);

        log.borrow_mut().clear();
        doc.dispatch_event(div, &Event::new("click"));
        assert_eq!(*log.borrow(), vec!["div"]);
    }

    #[test]
    fn detached_target_does_not_reach_document() {
        let doc = Document::new();
        let (log, make) = log();
        let div = doc.create_element("div");
        doc.add_event_listener(EventTarget::Document, "click", make("document"), ListenerOptions::default());
        doc.dispatch_event(div, &Event::new("click").bubbling());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn stop_propagation_finishes_current_target() {
        let doc = Document::new();
        let (log, make) = log();
        let div = ElementBuilder::new("div").append_to(&doc, doc.body());
        doc.add_event_listener(div, "click", handler(|e: &Event| e.stop_propagation()), ListenerOptions::default());
        doc.add_event_listener(div, "click", make("second"), ListenerOptions::default());
        doc.add_event_listener(doc.body(), "click", make("body"), ListenerOptions::default());
        doc.dispatch_event(div, &Event::new("click").bubbling());
        assert_eq!(*log.borrow(), vec!["second"]);
    }

    #[test]
    fn stop_immediate_skips_remaining_listeners() {
        let doc = Document::new();
        let (log, make) = log();
        let div = ElementBuilder::new("div").append_to(&doc, doc.body());
        doc.add_event_listener(div, "click", handler(|e: &Event| e.stop_immediate_propagation()), ListenerOptions::default());
        doc.add_event_listener(div, "click", make("second"), ListenerOptions::default());
        doc.dispatch_event(div, &Event::new("click").bubbling());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn once_listener_runs_once() {
        let doc = Document::new();
        let (log, make) = log();
        doc.add_event_listener(EventTarget::Window, "resize", make("once"), ListenerOptions::once());
        doc.dispatch_event(EventTarget::Window, &Event::new("resize"));
        doc.dispatch_event(EventTarget::Window, &Event::new("resize"));
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(doc.total_listeners(), 0);
    }

    #[test]
    fn listener_removed_mid_dispatch_does_not_run() {
        let doc = Document::new();
        let (log, make) = log();
        let second = make("second");
        let doc2 = doc.clone();
        let second2 = second.clone();
        doc.add_event_listener(
            EventTarget::Document,
            "x",
            handler(move |_| {
                doc2.remove_event_listener(EventTarget::Document, "x", &second2);
            }),
            ListenerOptions::default(),
        );
        doc.add_event_listener(EventTarget::Document, "x", second, ListenerOptions::default());
        doc.dispatch_event(EventTarget::Document, &Event::new("x"));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn dispatch_reports_prevent_default() {
        let doc = Document::new();
        doc.add_event_listener(EventTarget::Document, "x", handler(|e: &Event| e.prevent_default()), ListenerOptions::default());
        assert!(!doc.dispatch_event(EventTarget::Document, &Event::custom("x", serde_json::Value::Null)));
        // Not cancelable: prevent_default is ignored.
        assert!(doc.dispatch_event(EventTarget::Document, &Event::new("x")));
    }

    // ── Focus ────────────────────────────────────────────────────────

    #[test]
    fn focusability_rules() {
        let doc = Document::new();
        let body = doc.body();
        let button = ElementBuilder::new("button").append_to(&doc, body);
        let div = ElementBuilder::new("div").append_to(&doc, body);
        let tabbable_div = ElementBuilder::new("div").attr("tabindex", "0").append_to(&doc, body);
        let programmatic = ElementBuilder::new("div").attr("tabindex", "-1").append_to(&doc, body);
        let disabled = ElementBuilder::new("button").attr("disabled", "").append_to(&doc, body);
        let hidden_input = ElementBuilder::new("input").attr("type", "hidden").append_to(&doc, body);
        let hidden_parent = ElementBuilder::new("div")
            .attr("hidden", "")
            .child(ElementBuilder::new("button"))
            .append_to(&doc, body);
        let buried = doc.children(hidden_parent)[0];

        assert!(doc.is_focusable(button));
        assert!(!doc.is_focusable(div));
        assert!(doc.is_tabbable(tabbable_div));
        assert!(doc.is_focusable(programmatic));
        assert!(!doc.is_tabbable(programmatic));
        assert!(!doc.is_focusable(disabled));
        assert!(!doc.is_focusable(hidden_input));
        assert!(!doc.is_focusable(buried));
        assert_eq!(doc.tabbable_within(body), vec![button, tabbable_div]);
    }

    #[test]
    fn focus_fires_blur_then_focus() {
        let doc = Document::new();
        let (log, make) = log();
        let a = ElementBuilder::new("button").append_to(&doc, doc.body());
        let b = ElementBuilder::new("button").append_to(&doc, doc.body());
        doc.add_event_listener(a, "blur", make("blur a"), ListenerOptions::default());
        doc.add_event_listener(b, "focus", make("focus b"), ListenerOptions::default());
        doc.add_event_listener(doc.body(), "focusin", make("focusin"), ListenerOptions::default());
        assert!(doc.focus(a));
        assert!(doc.focus(b));
        assert_eq!(doc.active_element(), Some(b));
        assert_eq!(*log.borrow(), vec!["focusin", "blur a", "focus b", "focusin"]);
    }

    #[test]
    fn focus_next_wraps() {
        let doc = Document::new();
        let a = ElementBuilder::new("button").append_to(&doc, doc.body());
        let b = ElementBuilder::new("button").append_to(&doc, doc.body());
        assert_eq!(doc.focus_next(false), Some(a));
        assert_eq!(doc.focus_next(false), Some(b));
        assert_eq!(doc.focus_next(false), Some(a));
        assert_eq!(doc.focus_next(true), Some(b));
    }

    #[test]
    fn removing_focused_node_clears_focus() {
        let doc = Document::new();
        let a = ElementBuilder::new("button").append_to(&doc, doc.body());
        doc.focus(a);
        doc.remove_node(a);
        assert_eq!(doc.active_element(), None);
    }

    // ── Layers ───────────────────────────────────────────────────────

    #[test]
    fn layer_stack() {
        let doc = Document::new();
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        doc.push_layer(a);
        doc.push_layer(b);
        assert_eq!(doc.top_layer(), Some(b));
        doc.push_layer(a);
        assert_eq!(doc.top_layer(), Some(a));
        assert_eq!(doc.layer_count(), 2);
        assert!(doc.remove_layer(a));
        assert_eq!(doc.top_layer(), Some(b));
    }

    // ── Timers ───────────────────────────────────────────────────────

    #[test]
    fn advance_runs_due_timers_in_order() {
        let doc = Document::new();
        let fired = Rc::new(RefCell::new(Vec::new()));
        for (delay, label) in [(300, "c"), (100, "a"), (200, "b")] {
            let fired = fired.clone();
            doc.set_timeout(delay, move || fired.borrow_mut().push(label));
        }
        doc.advance_timers(250);
        assert_eq!(*fired.borrow(), vec!["a", "b"]);
        assert_eq!(doc.now(), 250);
        doc.advance_timers(50);
        assert_eq!(*fired.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn timers_scheduled_by_callbacks_run_within_window() {
        let doc = Document::new();
        let fired = Rc::new(Cell::new(0));
        let doc2 = doc.clone();
        let fired2 = fired.clone();
        doc.set_timeout(10, move || {
            let fired3 = fired2.clone();
            doc2.set_timeout(10, move || fired3.set(fired3.get() + 1));
        });
        doc.advance_timers(20);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn clear_timeout_cancels() {
        let doc = Document::new();
        let fired = Rc::new(Cell::new(false));
        let fired2 = fired.clone();
        let id = doc.set_timeout(10, move || fired2.set(true));
        assert!(doc.clear_timeout(id));
        doc.advance_timers(100);
        assert!(!fired.get());
        assert!(!doc.timer_pending(id));
    }

    #[tokio::test(start_paused = true)]
    async fn drive_timers_follows_tokio_clock() {
        let doc = Document::new();
        let fired = Rc::new(Cell::new(0));
        for delay in [5, 50] {
            let fired = fired.clone();
            doc.set_timeout(delay, move || fired.set(fired.get() + 1));
        }
        let start = tokio::time::Instant::now();
        doc.drive_timers().await;
        assert_eq!(fired.get(), 2);
        assert_eq!(doc.now(), 50);
        assert_eq!(start.elapsed(), Duration::from_millis(50));
    }
}
