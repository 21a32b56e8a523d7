//! Accordion: stacked disclosure panels, exclusive or multiple.
//!
//! ```text
//! <div data-coral-accordion>
//!   <div data-coral-accordion-item>
//!     <button data-coral-accordion-trigger>Section</button>
//!     <div data-coral-accordion-panel>...</div>
//!   </div>
//! </div>
//! ```

use std::collections::BTreeSet;

use serde_json::json;

use crate::document::Document;
use crate::dom::NodeId;
use crate::error::Error;
use crate::event::{EventName, Key, WidgetKind};
use crate::runtime::attrs;
use crate::runtime::config::{ConfigPatch, ConfigWarning};
use crate::runtime::context;
use crate::runtime::{Component, Hooks, LifecycleHook, RenderView, Setup, Widget};
use crate::Patch;

const KIND: WidgetKind = WidgetKind::Accordion;

#[derive(Debug, Clone, PartialEq, Patch)]
pub struct AccordionConfig {
    /// Allow several panels open at once.
    pub multiple: bool,
    pub default_open: Vec<usize>,
    /// Whether the last open panel may be closed (single mode).
    pub collapsible: bool,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Patch)]
pub struct AccordionState {
    pub open_panels: BTreeSet<usize>,
}

#[derive(Debug, Clone, Copy)]
struct AccordionItem {
    item: NodeId,
    trigger: NodeId,
    panel: NodeId,
}

pub struct Accordion {
    items: Vec<AccordionItem>,
}

impl Component for Accordion {
    type Config = AccordionConfig;
    type State = AccordionState;
    const KIND: WidgetKind = KIND;

    fn default_config() -> AccordionConfig {
        AccordionConfig {
            multiple: false,
            default_open: Vec::new(),
            collapsible: true,
            disabled: false,
        }
    }

    fn initial_state(config: &AccordionConfig) -> AccordionState {
        AccordionState {
            open_panels: config.default_open.iter().copied().collect(),
        }
    }

    fn config_from_dom(doc: &Document, element: NodeId) -> ConfigPatch<Self> {
        AccordionConfigPatch {
            multiple: attrs::bool_attr(doc, element, "data-multiple"),
            default_open: doc
                .attr(element, "data-default-open")
                .map(|v| attrs::parse_index_list(&v)),
            collapsible: attrs::bool_attr(doc, element, "data-collapsible"),
            disabled: attrs::bool_attr(doc, element, "data-disabled"),
        }
    }

    fn validate_config(config: &mut AccordionConfig) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        if !config.multiple && config.default_open.len() > 1 {
            config.default_open.truncate(1);
            warnings.push(ConfigWarning::new(
                "default_open",
                "only one panel may start open when `multiple` is false; keeping the first",
            ));
        }
        warnings
    }

    fn setup_aria(setup: &mut Setup<'_, Self>) -> Result<Self, Error> {
        let mut items = Vec::new();
        for item in setup.parts("item") {
            let trigger = setup.parts_within(item, "trigger").into_iter().next();
            let panel = setup.parts_within(item, "panel").into_iter().next();
            let (Some(trigger), Some(panel)) = (trigger, panel) else {
                continue;
            };
            let trigger_id = setup.ensure_id(trigger, "accordion-trigger");
            let panel_id = setup.ensure_id(panel, "accordion-panel");
            setup.set_attr(trigger, "aria-controls", &panel_id);
            setup.set_attr_default(panel, "role", "region");
            setup.set_attr(panel, "aria-labelledby", &trigger_id);
            items.push(AccordionItem {
                item,
                trigger,
                panel,
            });
        }
        Ok(Accordion { items })
    }

    fn bind_events(widget: &Widget<Self>) {
        for (index, item) in widget.component().items.iter().enumerate() {
            widget.on(item.trigger, "click", move |w, _| {
                if !w.config().disabled {
                    w.toggle_panel(index);
                }
            });
            widget.on(item.trigger, "keydown", move |w, ev| {
                let count = w.item_count();
                let target = match ev.key() {
                    Some(Key::ArrowDown) => (index + 1) % count,
                    Some(Key::ArrowUp) => (index + count - 1) % count,
                    Some(Key::Home) => 0,
                    Some(Key::End) => count - 1,
                    _ => return,
                };
                ev.prevent_default();
                if let Some(trigger) = w.component().items.get(target).map(|i| i.trigger) {
                    w.document().focus(trigger);
                }
            });
        }
    }

    fn render(&self, view: &RenderView<'_, Self>) {
        let doc = view.document();
        let state = view.state();
        let disabled = view.config().disabled;
        doc.toggle_attr(view.element(), "data-disabled", disabled);
        for (index, item) in self.items.iter().enumerate() {
            let open = state.open_panels.contains(&index);
            doc.set_bool_attr(item.trigger, "aria-expanded", open);
            doc.toggle_attr(item.trigger, "data-open", open);
            doc.toggle_attr(item.trigger, "aria-disabled", disabled);
            view.set_open_state(item.trigger, open);
            view.set_open_state(item.item, open);
            doc.toggle_attr(item.panel, "hidden", !open);
            view.set_open_state(item.panel, open);
        }
    }

    fn on_ready(widget: &Widget<Self>) {
        let count = widget.item_count();
        let state = widget.state();
        if state.open_panels.iter().any(|&i| i >= count) {
            let pruned = state.open_panels.iter().copied().filter(|&i| i < count).collect();
            widget.set_state(AccordionStatePatch::default().open_panels(pruned));
        }
    }
}

impl Widget<Accordion> {
    pub fn item_count(&self) -> usize {
        self.component().items.len()
    }

    pub fn is_panel_open(&self, index: usize) -> bool {
        self.state().open_panels.contains(&index)
    }

    pub fn open_panels(&self) -> Vec<usize> {
        self.state().open_panels.iter().copied().collect()
    }

    /// Open `index`, closing the others in single mode. Out of range is a no-op.
    pub fn open_panel(&self, index: usize) {
        if index >= self.item_count() || self.is_panel_open(index) {
            return;
        }
        let previous = self.state().open_panels.clone();
        let next: BTreeSet<usize> = if self.config().multiple {
            previous.iter().copied().chain([index]).collect()
        } else {
            BTreeSet::from([index])
        };
        self.set_state(AccordionStatePatch::default().open_panels(next.clone()));
        for closed in previous.difference(&next) {
            self.emit(LifecycleHook::Close, EventName::Close, json!({ "index": closed }));
        }
        self.emit(LifecycleHook::Open, EventName::Open, json!({ "index": index }));
        self.dispatch_change();
    }

    /// Close `index`. In single mode with `collapsible: false` the last open panel
    /// stays open.
    pub fn close_panel(&self, index: usize) {
        if !self.is_panel_open(index) {
            return;
        }
        let config = self.config();
        if !config.multiple && !config.collapsible {
            return;
        }
        let mut next = self.state().open_panels.clone();
        next.remove(&index);
        self.set_state(AccordionStatePatch::default().open_panels(next));
        self.emit(LifecycleHook::Close, EventName::Close, json!({ "index": index }));
        self.dispatch_change();
    }

    pub fn toggle_panel(&self, index: usize) {
        if self.is_panel_open(index) {
            self.close_panel(index);
        } else {
            self.open_panel(index);
        }
    }

    /// Open every panel. Only meaningful with `multiple: true`.
    pub fn open_all(&self) {
        if !self.config().multiple {
            return;
        }
        let previous = self.state().open_panels.clone();
        let all: BTreeSet<usize> = (0..self.item_count()).collect();
        if all == previous {
            return;
        }
        self.set_state(AccordionStatePatch::default().open_panels(all.clone()));
        for opened in all.difference(&previous) {
            self.emit(LifecycleHook::Open, EventName::Open, json!({ "index": opened }));
        }
        self.dispatch_change();
    }

    /// Close every panel, regardless of `collapsible`.
    pub fn close_all(&self) {
        let previous = self.state().open_panels.clone();
        if previous.is_empty() {
            return;
        }
        self.set_state(AccordionStatePatch::default().open_panels(BTreeSet::new()));
        for closed in &previous {
            self.emit(LifecycleHook::Close, EventName::Close, json!({ "index": closed }));
        }
        self.dispatch_change();
    }

    /// Index of the item containing `node`.
    ///
    /// Fails if `node` is not inside any accordion; `None` if it belongs to
    /// another one or sits outside every item.
    pub fn item_index_for(&self, node: NodeId) -> Result<Option<usize>, Error> {
        let doc = self.document();
        if context::closest_context(doc, node, KIND)? != self.element() {
            return Ok(None);
        }
        Ok(self
            .component()
            .items
            .iter()
            .position(|i| doc.is_within(i.item, node)))
    }

    pub fn trigger(&self, index: usize) -> Option<NodeId> {
        self.component().items.get(index).map(|i| i.trigger)
    }

    pub fn panel(&self, index: usize) -> Option<NodeId> {
        self.component().items.get(index).map(|i| i.panel)
    }

    fn dispatch_change(&self) {
        self.dispatch(EventName::Change, json!({ "openPanels": self.open_panels() }));
    }
}

pub fn create_accordion(doc: &Document, element: NodeId, overrides: AccordionConfigPatch) -> Result<Widget<Accordion>, Error> {
    Widget::create(doc, element, overrides)
}

pub fn create_accordion_with_hooks(
    doc: &Document,
    element: NodeId,
    overrides: AccordionConfigPatch,
    hooks: Hooks<AccordionState>,
) -> Result<Widget<Accordion>, Error> {
    Widget::create_with_hooks(doc, element, overrides, hooks)
}
