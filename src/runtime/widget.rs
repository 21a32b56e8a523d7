//! `Widget<C>`: one live component instance and its lifecycle.
//!
//! The handle is a cheap `Rc` clone. The document keeps every live instance in its
//! registry until [`Widget::destroy`], so widgets created by `init_components` stay
//! alive without the caller holding them. Listeners and timers only hold weak
//! references and do nothing once the widget is destroyed.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::Value;

use crate::document::Document;
use crate::dom::NodeId;
use crate::error::Error;
use crate::event::{event_type, handler, Event, EventName, EventTarget, Handler, ListenerId, ListenerOptions, WidgetKind};
use crate::runtime::component::{remove_generated, Component, Generated, RenderView, Setup};
use crate::runtime::config::{resolve_config, revalidate, ConfigPatch, ConfigWarning};
use crate::runtime::focus_trap::handle_trap_keydown;
use crate::runtime::hooks::{Hooks, InterceptHook, LifecycleHook};
use crate::runtime::scroll_lock::ScrollLockGuard;
use crate::runtime::store::{Patch, StateStore, Subscription};
use crate::runtime::tracked::{parse_handler_key, TrackedListener, TrackedListeners};
use crate::timer::TimerId;

struct WidgetInner<C: Component> {
    doc: Document,
    element: NodeId,
    component: C,
    config: RefCell<C::Config>,
    warnings: RefCell<Vec<ConfigWarning>>,
    store: StateStore<C::State>,
    hooks: Hooks<C::State>,
    listeners: RefCell<TrackedListeners>,
    timers: RefCell<Vec<TimerId>>,
    traps: RefCell<Vec<(NodeId, Handler)>>,
    layers: RefCell<Vec<NodeId>>,
    scroll_guard: RefCell<Option<ScrollLockGuard>>,
    generated: RefCell<Generated>,
    destroyed: Cell<bool>,
}

/// Handle to a live component instance.
pub struct Widget<C: Component> {
    inner: Rc<WidgetInner<C>>,
}

impl<C: Component> Clone for Widget<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Non-owning widget handle, used by listeners and timers.
pub struct WeakWidget<C: Component>(Weak<WidgetInner<C>>);

impl<C: Component> Clone for WeakWidget<C> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<C: Component> WeakWidget<C> {
    pub fn upgrade(&self) -> Option<Widget<C>> {
        self.0.upgrade().map(|inner| Widget { inner })
    }
}

impl<C: Component> Widget<C> {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Construct a widget on `element` with caller overrides.
    pub fn create(doc: &Document, element: NodeId, overrides: ConfigPatch<C>) -> Result<Self, Error> {
        Self::create_with_hooks(doc, element, overrides, Hooks::new())
    }

    /// Construct with lifecycle hooks.
    ///
    /// Order: resolve config, initial state, `setup_aria`, `bind_events`, first
    /// render, `on_ready`, then the `init` hook and event. If setup fails, every
    /// node and id it generated is removed again.
    pub fn create_with_hooks(
        doc: &Document,
        element: NodeId,
        overrides: ConfigPatch<C>,
        hooks: Hooks<C::State>,
    ) -> Result<Self, Error> {
        if !doc.contains(element) {
            return Err(Error::UnknownNode(element));
        }
        let (config, warnings) = resolve_config::<C>(doc, element, overrides);
        let state = C::initial_state(&config);

        let mut setup = Setup::<C>::new(doc, element, &config, &state);
        let component = match C::setup_aria(&mut setup) {
            Ok(component) => component,
            Err(err) => {
                setup.rollback();
                return Err(err);
            }
        };
        let generated = setup.finish();

        let widget = Widget {
            inner: Rc::new(WidgetInner {
                doc: doc.clone(),
                element,
                component,
                config: RefCell::new(config),
                warnings: RefCell::new(warnings),
                store: StateStore::new(state),
                hooks,
                listeners: RefCell::new(TrackedListeners::default()),
                timers: RefCell::new(Vec::new()),
                traps: RefCell::new(Vec::new()),
                layers: RefCell::new(Vec::new()),
                scroll_guard: RefCell::new(None),
                generated: RefCell::new(generated),
                destroyed: Cell::new(false),
            }),
        };
        doc.register_instance(element, C::KIND, Box::new(widget.clone()));

        C::bind_events(&widget);
        widget.render();
        C::on_ready(&widget);
        tracing::debug!(widget = %C::KIND, listeners = widget.listener_count(), "created");
        widget.emit(LifecycleHook::Init, EventName::Init, Value::Null);
        Ok(widget)
    }

    pub fn downgrade(&self) -> WeakWidget<C> {
        WeakWidget(Rc::downgrade(&self.inner))
    }

    /// Whether both handles refer to the same instance.
    pub fn ptr_eq(&self, other: &Widget<C>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn document(&self) -> &Document {
        &self.inner.doc
    }

    /// The host element.
    pub fn element(&self) -> NodeId {
        self.inner.element
    }

    pub fn component(&self) -> &C {
        &self.inner.component
    }

    /// Current state snapshot.
    pub fn state(&self) -> Rc<C::State> {
        self.inner.store.get()
    }

    pub fn config(&self) -> C::Config {
        self.inner.config.borrow().clone()
    }

    /// Repairs made by the last configuration validation.
    pub fn config_warnings(&self) -> Vec<ConfigWarning> {
        self.inner.warnings.borrow().clone()
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }

    /// Whether the host is attached to the document.
    pub fn is_mounted(&self) -> bool {
        self.inner.doc.is_connected(self.inner.element)
    }

    // -----------------------------------------------------------------------
    // State & render
    // -----------------------------------------------------------------------

    /// Merge `patch` into state, render, notify subscribers, then `on_state_change`.
    ///
    /// Ignored once destroyed.
    pub fn set_state(&self, patch: <C::State as Patch>::Patch) {
        if self.is_destroyed() {
            return;
        }
        let next = self.inner.store.update(patch);
        self.render();
        self.inner.store.notify(&next);
        if let Some(hook) = self.inner.hooks.state_change() {
            hook(&*next);
        }
    }

    pub fn subscribe(&self, f: impl Fn(&Rc<C::State>) + 'static) -> Subscription {
        self.inner.store.subscribe(f)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.store.subscriber_count()
    }

    /// Run the component's render against current state and config.
    pub fn render(&self) {
        if self.is_destroyed() {
            return;
        }
        let config = self.config();
        let state = self.state();
        let view = RenderView::<C> {
            doc: &self.inner.doc,
            element: self.inner.element,
            config: &config,
            state: &state,
        };
        self.inner.component.render(&view);
    }

    /// Merge new configuration, re-validate, run `on_config_change` and re-render.
    /// Setup does not re-run.
    pub fn update(&self, patch: ConfigPatch<C>) {
        if self.is_destroyed() {
            return;
        }
        let mut config = self.config();
        config.apply(patch);
        let warnings = revalidate::<C>(&mut config);
        *self.inner.config.borrow_mut() = config;
        *self.inner.warnings.borrow_mut() = warnings;
        C::on_config_change(self);
        self.render();
    }

    // -----------------------------------------------------------------------
    // Dispatch & hooks
    // -----------------------------------------------------------------------

    /// Fire `coral:<kind>:<name>` on the host. Returns `false` if a listener
    /// prevented the default.
    pub fn dispatch(&self, name: EventName, detail: Value) -> bool {
        let event = Event::custom(event_type(C::KIND, name), detail);
        self.inner.doc.dispatch_event(self.inner.element, &event)
    }

    /// Run the lifecycle hook, then dispatch the matching event.
    pub fn emit(&self, hook: LifecycleHook, name: EventName, detail: Value) -> bool {
        if let Some(f) = self.inner.hooks.lifecycle(hook) {
            f();
        }
        self.dispatch(name, detail)
    }

    /// Decide whether a user-initiated default action may run.
    ///
    /// The hook sees `trigger` first. If the trigger ends up default-prevented, no
    /// event is dispatched and this returns `false`. Otherwise the cancelable
    /// `coral:<kind>:<name>` event is dispatched and its outcome returned.
    pub fn intercept(&self, hook: InterceptHook, name: EventName, trigger: &Event) -> bool {
        if let Some(f) = self.inner.hooks.intercept(hook) {
            f(trigger);
        }
        if trigger.default_prevented() {
            return false;
        }
        self.dispatch(
            name,
            serde_json::json!({ "originalType": trigger.event_type() }),
        )
    }

    // -----------------------------------------------------------------------
    // Tracked listeners
    // -----------------------------------------------------------------------

    /// Attach a listener and record it for removal on destroy.
    pub fn add_event_listener(
        &self,
        target: impl Into<EventTarget>,
        event_type: &str,
        handler: Handler,
        options: ListenerOptions,
    ) -> ListenerId {
        self.track_listener(target.into(), event_type, handler, options, None)
    }

    fn track_listener(
        &self,
        target: EventTarget,
        event_type: &str,
        handler: Handler,
        options: ListenerOptions,
        key: Option<String>,
    ) -> ListenerId {
        let id = self
            .inner
            .doc
            .add_event_listener(target, event_type, handler.clone(), options);
        let mut listeners = self.inner.listeners.borrow_mut();
        if !listeners.ids().any(|existing| existing == id) {
            listeners.push(TrackedListener {
                target,
                event_type: event_type.to_owned(),
                handler,
                id,
                key,
            });
        }
        tracing::trace!(widget = %C::KIND, event_type, tracked = listeners.len(), "listener attached");
        id
    }

    /// Detach a listener and drop its tracked entries.
    pub fn remove_event_listener(&self, target: impl Into<EventTarget>, event_type: &str, handler: &Handler) -> bool {
        let target = target.into();
        let native = self.inner.doc.remove_event_listener(target, event_type, handler);
        let tracked = self
            .inner
            .listeners
            .borrow_mut()
            .remove_matching(target, event_type, handler);
        tracing::trace!(widget = %C::KIND, event_type, removed = tracked.len(), "listener detached");
        native || !tracked.is_empty()
    }

    /// Attach `f` as a tracked listener. `f` receives the widget, and is skipped
    /// once the widget is destroyed.
    ///
    /// Returns the handler so it can be passed to `remove_event_listener`.
    pub fn on(
        &self,
        target: impl Into<EventTarget>,
        event_type: &str,
        f: impl Fn(&Widget<C>, &Event) + 'static,
    ) -> Handler {
        self.on_with(target, event_type, ListenerOptions::default(), f)
    }

    pub fn on_with(
        &self,
        target: impl Into<EventTarget>,
        event_type: &str,
        options: ListenerOptions,
        f: impl Fn(&Widget<C>, &Event) + 'static,
    ) -> Handler {
        let h = self.bound(f);
        self.add_event_listener(target, event_type, h.clone(), options);
        h
    }

    fn bound(&self, f: impl Fn(&Widget<C>, &Event) + 'static) -> Handler {
        let weak = self.downgrade();
        handler(move |event| {
            if let Some(widget) = weak.upgrade() {
                if !widget.is_destroyed() {
                    f(&widget, event);
                }
            }
        })
    }

    /// Bind under a `"type-suffix"` key; the event type is the text before the
    /// first `-`. Rebinding a key replaces the previous listener.
    pub fn bind_keyed(
        &self,
        key: &str,
        target: impl Into<EventTarget>,
        f: impl Fn(&Widget<C>, &Event) + 'static,
    ) -> Handler {
        self.unbind_keyed(key);
        let h = self.bound(f);
        self.track_listener(
            target.into(),
            parse_handler_key(key),
            h.clone(),
            ListenerOptions::default(),
            Some(key.to_owned()),
        );
        h
    }

    /// Remove the listener bound under `key`. Unknown keys are a no-op.
    pub fn unbind_keyed(&self, key: &str) -> bool {
        let taken = self.inner.listeners.borrow_mut().take_keyed(key);
        for entry in &taken {
            self.inner.doc.remove_listener(entry.id);
        }
        !taken.is_empty()
    }

    /// Tracked listeners still registered on the document.
    pub fn listener_count(&self) -> usize {
        let ids: Vec<ListenerId> = self.inner.listeners.borrow().ids().collect();
        ids.into_iter().filter(|&id| self.inner.doc.has_listener(id)).count()
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    /// Schedule `f` on the document clock. Cancelled on destroy.
    pub fn set_timeout(&self, delay_ms: u64, f: impl FnOnce(&Widget<C>) + 'static) -> TimerId {
        let weak = self.downgrade();
        let doc = &self.inner.doc;
        let id = doc.set_timeout(delay_ms, move || {
            if let Some(widget) = weak.upgrade() {
                if !widget.is_destroyed() {
                    f(&widget);
                }
            }
        });
        let mut timers = self.inner.timers.borrow_mut();
        timers.retain(|&t| doc.timer_pending(t));
        timers.push(id);
        id
    }

    pub fn clear_timeout(&self, id: TimerId) -> bool {
        self.inner.timers.borrow_mut().retain(|&t| t != id);
        self.inner.doc.clear_timeout(id)
    }

    /// Owned timers that have not fired yet.
    pub fn pending_timers(&self) -> usize {
        let timers: Vec<TimerId> = self.inner.timers.borrow().clone();
        timers.into_iter().filter(|&t| self.inner.doc.timer_pending(t)).count()
    }

    // -----------------------------------------------------------------------
    // Focus trap, layers, scroll lock
    // -----------------------------------------------------------------------

    /// Keep Tab focus inside `container` and move focus in if it is outside.
    ///
    /// Returns `false` if the container is already trapped.
    pub fn trap_focus(&self, container: NodeId) -> bool {
        let doc = &self.inner.doc;
        if !doc.focus_traps().push(container, doc.active_element()) {
            return false;
        }
        let weak_doc = doc.downgrade();
        let h = handler(move |event| {
            if let Some(doc) = weak_doc.upgrade() {
                handle_trap_keydown(&doc, container, event);
            }
        });
        self.add_event_listener(EventTarget::Document, "keydown", h.clone(), ListenerOptions::default());
        self.inner.traps.borrow_mut().push((container, h));

        let inside = doc.active_element().is_some_and(|a| doc.is_within(container, a));
        if !inside {
            let first = doc.tabbable_within(container).into_iter().next();
            match first {
                Some(node) => {
                    doc.focus(node);
                }
                None => {
                    doc.focus(container);
                }
            }
        }
        true
    }

    /// Remove the trap on `container` and restore focus to where it was.
    pub fn release_focus_trap(&self, container: NodeId) -> bool {
        let entry = {
            let mut traps = self.inner.traps.borrow_mut();
            let pos = traps.iter().position(|(c, _)| *c == container);
            pos.map(|p| traps.remove(p))
        };
        let Some((_, h)) = entry else {
            return false;
        };
        self.remove_event_listener(EventTarget::Document, "keydown", &h);
        let doc = &self.inner.doc;
        if let Some(restore) = doc.focus_traps().remove(doc, container) {
            if doc.is_connected(restore) {
                doc.focus(restore);
            }
        }
        true
    }

    pub fn has_focus_trap(&self, container: NodeId) -> bool {
        self.inner.traps.borrow().iter().any(|(c, _)| *c == container)
    }

    /// Make `node` the topmost dismissable layer.
    pub fn push_layer(&self, node: NodeId) {
        self.inner.doc.push_layer(node);
        let mut layers = self.inner.layers.borrow_mut();
        if !layers.contains(&node) {
            layers.push(node);
        }
    }

    pub fn remove_layer(&self, node: NodeId) {
        self.inner.layers.borrow_mut().retain(|&n| n != node);
        self.inner.doc.remove_layer(node);
    }

    /// Whether `node` is the topmost layer and `event` was not yet claimed by
    /// another layer. Claims it when both hold.
    pub fn claim_layer_event(&self, node: NodeId, event: &Event) -> bool {
        self.inner.doc.top_layer() == Some(node) && event.claim_for_layer()
    }

    /// Hold the body scroll lock. Holding it twice is a no-op.
    pub fn lock_scroll(&self) {
        let mut guard = self.inner.scroll_guard.borrow_mut();
        if guard.is_none() {
            *guard = Some(self.inner.doc.lock_scroll());
        }
    }

    pub fn unlock_scroll(&self) {
        let guard = self.inner.scroll_guard.borrow_mut().take();
        drop(guard);
    }

    pub fn holds_scroll_lock(&self) -> bool {
        self.inner.scroll_guard.borrow().is_some()
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Append the host to `parent`, then `on_mount` and the `mount` event.
    pub fn mount(&self, parent: NodeId) -> bool {
        if self.is_destroyed() || !self.inner.doc.append_child(parent, self.inner.element) {
            return false;
        }
        tracing::debug!(widget = %C::KIND, "mounted");
        self.emit(LifecycleHook::Mount, EventName::Mount, Value::Null);
        true
    }

    /// Detach the host, then `on_unmount` and the `unmount` event.
    pub fn unmount(&self) -> bool {
        if self.is_destroyed() || !self.inner.doc.detach(self.inner.element) {
            return false;
        }
        tracing::debug!(widget = %C::KIND, "unmounted");
        self.emit(LifecycleHook::Unmount, EventName::Unmount, Value::Null);
        true
    }

    /// Tear the instance down. Safe to call more than once.
    ///
    /// Runs `on_destroy` and the `destroy` event, then the component's teardown,
    /// then removes timers, focus traps, layers, the scroll hold, every tracked
    /// listener, generated nodes and ids, and subscribers. The host element stays.
    pub fn destroy(&self) {
        if self.inner.destroyed.replace(true) {
            return;
        }
        self.emit(LifecycleHook::Destroy, EventName::Destroy, Value::Null);
        self.inner.component.teardown(self);

        let doc = &self.inner.doc;
        let timers = std::mem::take(&mut *self.inner.timers.borrow_mut());
        for id in timers {
            doc.clear_timeout(id);
        }

        let traps: Vec<NodeId> = self.inner.traps.borrow().iter().map(|(c, _)| *c).collect();
        for container in traps {
            self.release_focus_trap(container);
        }

        let layers = std::mem::take(&mut *self.inner.layers.borrow_mut());
        for node in layers {
            doc.remove_layer(node);
        }

        self.unlock_scroll();

        let listeners = self.inner.listeners.borrow_mut().drain();
        let removed = listeners.len();
        for entry in listeners {
            doc.remove_listener(entry.id);
        }

        let generated = std::mem::take(&mut *self.inner.generated.borrow_mut());
        remove_generated(doc, generated);

        self.inner.store.clear();
        doc.unregister_instance(self.inner.element, C::KIND, self.instance_key());
        tracing::debug!(widget = %C::KIND, listeners = removed, "destroyed");
    }

    fn instance_key(&self) -> usize {
        Rc::as_ptr(&self.inner) as *const () as usize
    }
}

impl<C: Component> fmt::Debug for Widget<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("kind", &C::KIND)
            .field("element", &self.inner.element)
            .field("state", &self.inner.store.get())
            .field("destroyed", &self.inner.destroyed.get())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// AnyWidget
// ---------------------------------------------------------------------------

/// Type-erased widget handle, as held by the document registry and returned by
/// auto-init.
pub trait AnyWidget {
    fn kind(&self) -> WidgetKind;
    fn element(&self) -> NodeId;
    fn destroy(&self);
    fn is_destroyed(&self) -> bool;
    /// Identity of the underlying instance.
    fn instance_key(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
}

impl<C: Component> AnyWidget for Widget<C> {
    fn kind(&self) -> WidgetKind {
        C::KIND
    }

    fn element(&self) -> NodeId {
        self.inner.element
    }

    fn destroy(&self) {
        Widget::destroy(self);
    }

    fn is_destroyed(&self) -> bool {
        Widget::is_destroyed(self)
    }

    fn instance_key(&self) -> usize {
        Widget::instance_key(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for dyn AnyWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyWidget")
            .field("kind", &self.kind())
            .field("element", &self.element())
            .finish()
    }
}
