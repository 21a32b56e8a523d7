//! Dropdown menu: a trigger and a popup list of selectable items.

use serde_json::{json, Value};

use crate::document::Document;
use crate::dom::NodeId;
use crate::error::Error;
use crate::event::{EventName, EventTarget, Key, WidgetKind};
use crate::runtime::attrs;
use crate::runtime::context;
use crate::runtime::config::ConfigPatch;
use crate::runtime::{Component, Hooks, InterceptHook, LifecycleHook, RenderView, Setup, Widget};
use crate::Patch;

#[derive(Debug, Clone, PartialEq, Patch)]
pub struct DropdownConfig {
    pub default_open: bool,
    pub close_on_select: bool,
    pub close_on_escape: bool,
    pub close_on_outside_click: bool,
}

#[derive(Debug, Clone, PartialEq, Patch)]
pub struct DropdownState {
    pub open: bool,
    pub highlighted: Option<usize>,
}

pub struct Dropdown {
    trigger: NodeId,
    content: NodeId,
    items: Vec<NodeId>,
}

impl Component for Dropdown {
    type Config = DropdownConfig;
    type State = DropdownState;
    const KIND: WidgetKind = WidgetKind::Dropdown;

    fn default_config() -> DropdownConfig {
        DropdownConfig {
            default_open: false,
            close_on_select: true,
            close_on_escape: true,
            close_on_outside_click: true,
        }
    }

    fn initial_state(config: &DropdownConfig) -> DropdownState {
        DropdownState {
            open: config.default_open,
            highlighted: None,
        }
    }

    fn config_from_dom(doc: &Document, element: NodeId) -> ConfigPatch<Self> {
        let flag = |name: &str| attrs::bool_attr(doc, element, name);
        DropdownConfigPatch {
            default_open: flag("data-default-open"),
            close_on_select: flag("data-close-on-select"),
            close_on_escape: flag("data-close-on-escape"),
            close_on_outside_click: flag("data-close-on-outside-click"),
        }
    }

    fn setup_aria(setup: &mut Setup<'_, Self>) -> Result<Self, Error> {
        let trigger = setup.require_part("trigger")?;
        let content = setup.require_part("content")?;
        let items = setup.parts("item");

        let trigger_id = setup.ensure_id(trigger, "dropdown-trigger");
        let content_id = setup.ensure_id(content, "dropdown-content");
        setup.set_attr(trigger, "aria-haspopup", "menu");
        setup.set_attr(trigger, "aria-controls", &content_id);
        setup.set_attr_default(content, "role", "menu");
        setup.set_attr(content, "aria-labelledby", &trigger_id);
        for &item in &items {
            setup.ensure_id(item, "dropdown-item");
            setup.set_attr_default(item, "role", "menuitem");
            setup.set_attr_default(item, "tabindex", "-1");
        }
        Ok(Dropdown {
            trigger,
            content,
            items,
        })
    }

    fn bind_events(widget: &Widget<Self>) {
        let Dropdown {
            trigger, content, ..
        } = *widget.component();

        widget.on(trigger, "click", |w, _| w.toggle());
        widget.on(trigger, "keydown", |w, ev| match ev.key() {
            Some(Key::ArrowDown | Key::Enter | Key::Space) => {
                ev.prevent_default();
                w.open();
                w.highlight_step(0, 1);
            }
            Some(Key::ArrowUp) => {
                ev.prevent_default();
                w.open();
                w.highlight_step(w.item_count(), -1);
            }
            _ => {}
        });

        for (index, &item) in widget.component().items.iter().enumerate() {
            widget.on(item, "click", move |w, _| w.select(index));
            widget.on(item, "mousemove", move |w, _| w.highlight(index));
        }

        widget.on(content, "keydown", |w, ev| {
            let current = w.state().highlighted;
            match ev.key() {
                Some(Key::ArrowDown) => w.highlight_step(current.map_or(0, |i| i + 1), 1),
                Some(Key::ArrowUp) => w.highlight_step(current.unwrap_or(w.item_count()), -1),
                Some(Key::Home) => w.highlight_step(0, 1),
                Some(Key::End) => w.highlight_step(w.item_count(), -1),
                Some(Key::Enter | Key::Space) => {
                    if let Some(index) = current {
                        w.select(index);
                    }
                }
                Some(Key::Tab) => {
                    w.close();
                    return;
                }
                _ => return,
            }
            ev.prevent_default();
        });

        widget.on(EventTarget::Document, "keydown", |w, ev| {
            if ev.key() != Some(Key::Escape) || !w.is_open() {
                return;
            }
            let content = w.component().content;
            if !w.claim_layer_event(content, ev) {
                return;
            }
            if w.config().close_on_escape
                && w.intercept(InterceptHook::EscapeKeyDown, EventName::EscapeKeyDown, ev)
            {
                w.close();
                w.document().focus(w.component().trigger);
            }
        });

        widget.on(EventTarget::Document, "mousedown", |w, ev| {
            if !w.is_open() {
                return;
            }
            let Some(target) = ev.target_node() else {
                return;
            };
            let Dropdown { trigger, content, .. } = *w.component();
            let doc = w.document();
            if doc.is_within(content, target) || doc.is_within(trigger, target) {
                return;
            }
            if !w.claim_layer_event(content, ev) {
                return;
            }
            if w.config().close_on_outside_click
                && w.intercept(InterceptHook::InteractOutside, EventName::InteractOutside, ev)
            {
                w.close();
            }
        });
    }

    fn render(&self, view: &RenderView<'_, Self>) {
        let doc = view.document();
        let DropdownState { open, highlighted } = *view.state();
        doc.set_bool_attr(self.trigger, "aria-expanded", open);
        view.set_open_state(self.trigger, open);
        view.set_open_state(view.element(), open);
        doc.toggle_attr(view.element(), "data-open", open);
        doc.toggle_attr(self.content, "hidden", !open);
        view.set_open_state(self.content, open);
        for (index, &item) in self.items.iter().enumerate() {
            doc.toggle_attr(item, "data-highlighted", highlighted == Some(index));
        }
        match highlighted.and_then(|i| self.items.get(i)).and_then(|&n| doc.attr(n, "id")) {
            Some(id) => doc.set_attr(self.content, "aria-activedescendant", id),
            None => doc.remove_attr(self.content, "aria-activedescendant"),
        };
    }

    fn on_ready(widget: &Widget<Self>) {
        if widget.is_open() {
            widget.push_layer(widget.component().content);
        }
    }
}

impl Widget<Dropdown> {
    pub fn is_open(&self) -> bool {
        self.state().open
    }

    pub fn item_count(&self) -> usize {
        self.component().items.len()
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.state().highlighted
    }

    pub fn open(&self) {
        if self.is_open() || self.is_destroyed() {
            return;
        }
        self.close_other_menus();
        self.set_state(DropdownStatePatch::default().open(true));
        self.push_layer(self.component().content);
        self.emit(LifecycleHook::Open, EventName::Open, Value::Null);
    }

    pub fn close(&self) {
        if !self.is_open() || self.is_destroyed() {
            return;
        }
        self.set_state(DropdownStatePatch::default().open(false).highlighted(None));
        self.remove_layer(self.component().content);
        self.emit(LifecycleHook::Close, EventName::Close, Value::Null);
    }

    pub fn toggle(&self) {
        if self.is_open() {
            self.close();
        } else {
            self.open();
        }
    }

    /// Close open dropdowns on top of the layer stack, stopping at one this
    /// dropdown is nested inside.
    fn close_other_menus(&self) {
        let doc = self.document();
        while let Some(top) = doc.top_layer() {
            let Some(other) = context::closest_root(doc, top, WidgetKind::Dropdown)
                .and_then(|root| doc.instance::<Dropdown>(root))
            else {
                break;
            };
            if other.element() == self.element()
                || other.component().content != top
                || !other.is_open()
                || doc.is_within(top, self.element())
            {
                break;
            }
            other.close();
        }
    }

    /// Highlight and focus an enabled item. Disabled or out-of-range is a no-op.
    pub fn highlight(&self, index: usize) {
        if !self.is_open() || !self.item_enabled(index) || self.highlighted() == Some(index) {
            return;
        }
        self.set_state(DropdownStatePatch::default().highlighted(Some(index)));
        if let Some(&item) = self.component().items.get(index) {
            self.document().focus(item);
        }
    }

    /// Select an enabled item: `select {index, value}`, then close if configured.
    pub fn select(&self, index: usize) {
        if !self.item_enabled(index) {
            return;
        }
        let value = self.item_value(index);
        self.dispatch(EventName::Select, json!({ "index": index, "value": value }));
        if self.config().close_on_select {
            self.close();
            self.document().focus(self.component().trigger);
        }
    }

    /// `data-value`, falling back to the item's text.
    pub fn item_value(&self, index: usize) -> Option<String> {
        let item = *self.component().items.get(index)?;
        let doc = self.document();
        Some(doc.attr(item, "data-value").unwrap_or_else(|| doc.text(item).trim().to_owned()))
    }

    pub fn trigger(&self) -> NodeId {
        self.component().trigger
    }

    pub fn content(&self) -> NodeId {
        self.component().content
    }

    pub fn item(&self, index: usize) -> Option<NodeId> {
        self.component().items.get(index).copied()
    }

    fn item_enabled(&self, index: usize) -> bool {
        self.component()
            .items
            .get(index)
            .is_some_and(|&n| !self.document().has_attr(n, "data-disabled"))
    }

    /// Highlight the first enabled item from `start` moving by `step`, wrapping.
    /// A backwards search from `start` begins at `start - 1`.
    fn highlight_step(&self, start: usize, step: isize) {
        let count = self.item_count() as isize;
        if count == 0 {
            return;
        }
        let mut index = if step < 0 { start as isize - 1 } else { start as isize };
        for _ in 0..count {
            let wrapped = index.rem_euclid(count) as usize;
            if self.item_enabled(wrapped) {
                self.highlight(wrapped);
                return;
            }
            index += step;
        }
    }
}

pub fn create_dropdown(doc: &Document, element: NodeId, overrides: DropdownConfigPatch) -> Result<Widget<Dropdown>, Error> {
    Widget::create(doc, element, overrides)
}

pub fn create_dropdown_with_hooks(
    doc: &Document,
    element: NodeId,
    overrides: DropdownConfigPatch,
    hooks: Hooks<DropdownState>,
) -> Result<Widget<Dropdown>, Error> {
    Widget::create_with_hooks(doc, element, overrides, hooks)
}
