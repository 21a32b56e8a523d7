//! Behaviour shared by dialog-like widgets (dialog, drawer).
//!
//! While open, a modal's content is the document's topmost dismissable layer. Only
//! the topmost layer reacts to Escape and outside presses, and each such event is
//! claimed by one layer at most, so closing an inner modal never closes the outer
//! one too. Scroll lock and focus trap are held for exactly as long as it is open.

use serde_json::Value;

use crate::document::Document;
use crate::dom::NodeId;
use crate::error::Error;
use crate::event::{EventName, EventTarget, Key};
use crate::runtime::attrs;
use crate::runtime::{Component, InterceptHook, LifecycleHook, RenderView, Setup, Widget};
use crate::Patch;

#[derive(Debug, Clone, PartialEq, Patch)]
pub struct ModalState {
    pub open: bool,
}

/// The modal switches every dialog-like config carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalOptions {
    pub modal: bool,
    pub close_on_escape: bool,
    pub close_on_outside_click: bool,
    pub lock_scroll: bool,
    pub trap_focus: bool,
}

/// Modal switches read from markup; `None` where the attribute is absent.
#[derive(Debug, Default)]
pub(crate) struct ModalMarkup {
    pub default_open: Option<bool>,
    pub modal: Option<bool>,
    pub close_on_escape: Option<bool>,
    pub close_on_outside_click: Option<bool>,
    pub lock_scroll: Option<bool>,
    pub trap_focus: Option<bool>,
}

impl ModalMarkup {
    pub(crate) fn read(doc: &Document, element: NodeId) -> Self {
        let flag = |name: &str| attrs::bool_attr(doc, element, name);
        Self {
            default_open: flag("data-default-open"),
            modal: flag("data-modal"),
            close_on_escape: flag("data-close-on-escape"),
            close_on_outside_click: flag("data-close-on-outside-click"),
            lock_scroll: flag("data-lock-scroll"),
            trap_focus: flag("data-trap-focus"),
        }
    }
}

/// Cached parts of a dialog-like widget.
#[derive(Debug, Clone)]
pub struct ModalParts {
    pub trigger: Option<NodeId>,
    pub content: NodeId,
    pub overlay: Option<NodeId>,
    pub title: Option<NodeId>,
    pub description: Option<NodeId>,
    pub close: Vec<NodeId>,
}

impl ModalParts {
    /// Discover parts and wire their ARIA relationships. `content` is required.
    pub(crate) fn setup<C: Component>(setup: &mut Setup<'_, C>, modal: bool) -> Result<Self, Error> {
        let kind = C::KIND.as_str();
        let content = setup.require_part("content")?;
        let trigger = setup.part("trigger");
        let overlay = setup.part("overlay");
        let title = setup.part("title");
        let description = setup.part("description");
        let close = setup.parts("close");

        let content_id = setup.ensure_id(content, &format!("{kind}-content"));
        setup.set_attr_default(content, "role", "dialog");
        setup.set_attr_default(content, "tabindex", "-1");
        if modal {
            setup.set_attr(content, "aria-modal", "true");
        }
        if let Some(title) = title {
            let id = setup.ensure_id(title, &format!("{kind}-title"));
            setup.set_attr(content, "aria-labelledby", id);
        }
        if let Some(description) = description {
            let id = setup.ensure_id(description, &format!("{kind}-description"));
            setup.set_attr(content, "aria-describedby", id);
        }
        if let Some(trigger) = trigger {
            setup.set_attr(trigger, "aria-haspopup", "dialog");
            setup.set_attr(trigger, "aria-controls", &content_id);
        }
        if let Some(overlay) = overlay {
            setup.set_attr(overlay, "aria-hidden", "true");
        }
        for &button in &close {
            setup.set_attr_default(button, "aria-label", "Close");
        }

        Ok(Self {
            trigger,
            content,
            overlay,
            title,
            description,
            close,
        })
    }

    pub(crate) fn render<C: Component>(&self, view: &RenderView<'_, C>, open: bool) {
        let doc = view.document();
        view.set_open_state(view.element(), open);
        doc.toggle_attr(view.element(), "data-open", open);
        doc.toggle_attr(self.content, "hidden", !open);
        view.set_open_state(self.content, open);
        if let Some(overlay) = self.overlay {
            doc.toggle_attr(overlay, "hidden", !open);
            view.set_open_state(overlay, open);
        }
        if let Some(trigger) = self.trigger {
            doc.set_bool_attr(trigger, "aria-expanded", open);
            view.set_open_state(trigger, open);
        }
    }
}

/// A dialog-like component.
pub trait Modal: Component<State = ModalState> {
    fn modal_parts(&self) -> &ModalParts;

    fn options(config: &Self::Config) -> ModalOptions;
}

/// Initial state for a modal.
pub(crate) fn initial_state(default_open: bool) -> ModalState {
    ModalState { open: default_open }
}

/// Listeners every modal needs: trigger, close buttons, Escape, outside press.
pub(crate) fn bind_modal<C: Modal>(widget: &Widget<C>) {
    let parts = widget.component().modal_parts().clone();
    if let Some(trigger) = parts.trigger {
        widget.on(trigger, "click", |w, _| w.toggle());
    }
    for close in parts.close {
        widget.on(close, "click", |w, _| w.close());
    }

    widget.on(EventTarget::Document, "keydown", |w, ev| {
        if ev.key() != Some(Key::Escape) || !w.is_open() {
            return;
        }
        let content = w.component().modal_parts().content;
        if !w.claim_layer_event(content, ev) {
            return;
        }
        if C::options(&w.config()).close_on_escape
            && w.intercept(InterceptHook::EscapeKeyDown, EventName::EscapeKeyDown, ev)
        {
            w.close();
        }
    });

    widget.on(EventTarget::Document, "mousedown", |w, ev| {
        if !w.is_open() {
            return;
        }
        let parts = w.component().modal_parts();
        let Some(target) = ev.target_node() else {
            return;
        };
        let doc = w.document();
        let inside = doc.is_within(parts.content, target)
            || parts.trigger.is_some_and(|t| doc.is_within(t, target));
        if inside || !w.claim_layer_event(parts.content, ev) {
            return;
        }
        if C::options(&w.config()).close_on_outside_click
            && w.intercept(InterceptHook::InteractOutside, EventName::InteractOutside, ev)
        {
            w.close();
        }
    });
}

/// Acquire the resources an open modal holds, for `default_open`.
pub(crate) fn ready_modal<C: Modal>(widget: &Widget<C>) {
    if widget.is_open() {
        widget.activate();
    }
}

impl<C: Modal> Widget<C> {
    pub fn is_open(&self) -> bool {
        self.state().open
    }

    /// Open, then `on_open` and the `open` event.
    pub fn open(&self) {
        if self.is_open() || self.is_destroyed() {
            return;
        }
        self.set_state(ModalStatePatch::default().open(true));
        self.activate();
        self.emit(LifecycleHook::Open, EventName::Open, Value::Null);
    }

    /// Close, then `on_close` and the `close` event.
    pub fn close(&self) {
        if !self.is_open() || self.is_destroyed() {
            return;
        }
        self.set_state(ModalStatePatch::default().open(false));
        self.deactivate();
        self.emit(LifecycleHook::Close, EventName::Close, Value::Null);
    }

    pub fn toggle(&self) {
        if self.is_open() {
            self.close();
        } else {
            self.open();
        }
    }

    /// The content part.
    pub fn content(&self) -> NodeId {
        self.component().modal_parts().content
    }

    fn activate(&self) {
        let content = self.content();
        let options = C::options(&self.config());
        self.push_layer(content);
        if options.lock_scroll {
            self.lock_scroll();
        }
        if options.trap_focus {
            self.trap_focus(content);
        }
    }

    fn deactivate(&self) {
        let content = self.content();
        self.release_focus_trap(content);
        self.unlock_scroll();
        self.remove_layer(content);
    }
}
