//! Switch: a two-state toggle with an optional hidden form input.

use serde_json::json;

use crate::document::Document;
use crate::dom::{ElementBuilder, NodeId};
use crate::error::Error;
use crate::event::{EventName, WidgetKind};
use crate::runtime::attrs;
use crate::runtime::config::ConfigPatch;
use crate::runtime::{Component, Hooks, RenderView, Setup, Widget};
use crate::Patch;

#[derive(Debug, Clone, PartialEq, Patch)]
pub struct SwitchConfig {
    pub default_checked: bool,
    pub disabled: bool,
    pub required: bool,
    /// Form field name. A hidden input is generated when set.
    pub name: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Patch)]
pub struct SwitchState {
    pub checked: bool,
    pub disabled: bool,
}

pub struct Switch {
    input: Option<NodeId>,
    thumb: Option<NodeId>,
}

impl Component for Switch {
    type Config = SwitchConfig;
    type State = SwitchState;
    const KIND: WidgetKind = WidgetKind::Switch;

    fn default_config() -> SwitchConfig {
        SwitchConfig {
            default_checked: false,
            disabled: false,
            required: false,
            name: None,
            value: "on".into(),
        }
    }

    fn initial_state(config: &SwitchConfig) -> SwitchState {
        SwitchState {
            checked: config.default_checked,
            disabled: config.disabled,
        }
    }

    fn config_from_dom(doc: &Document, element: NodeId) -> ConfigPatch<Self> {
        let checked = attrs::bool_attr(doc, element, "aria-checked")
            .or_else(|| attrs::bool_attr(doc, element, "data-checked"));
        let disabled = attrs::bool_attr(doc, element, "disabled")
            .or_else(|| attrs::bool_attr(doc, element, "data-disabled"));
        SwitchConfigPatch {
            default_checked: checked,
            disabled,
            required: attrs::bool_attr(doc, element, "data-required"),
            name: doc.attr(element, "data-name").map(Some),
            value: doc.attr(element, "data-value"),
        }
    }

    fn setup_aria(setup: &mut Setup<'_, Self>) -> Result<Self, Error> {
        let host = setup.element();
        setup.ensure_id(host, "switch");
        setup.set_attr(host, "role", "switch");
        setup.set_attr_default(host, "tabindex", "0");
        if setup.config().required {
            setup.set_attr(host, "aria-required", "true");
        }
        let thumb = setup.part("thumb");
        let input = match setup.config().name.clone() {
            Some(name) => {
                let value = setup.config().value.clone();
                let input = ElementBuilder::new("input")
                    .attr("type", "hidden")
                    .attr("name", name)
                    .attr("value", value);
                Some(setup.create_element(host, input))
            }
            None => None,
        };
        Ok(Switch { input, thumb })
    }

    fn bind_events(widget: &Widget<Self>) {
        let host = widget.element();
        widget.on(host, "click", |w, ev| {
            ev.prevent_default();
            w.toggle_from_user();
        });
        widget.on(host, "keydown", |w, ev| {
            if ev.key().is_some_and(|k| k.is_activation()) {
                ev.prevent_default();
                w.toggle_from_user();
            }
        });
    }

    fn render(&self, view: &RenderView<'_, Self>) {
        let doc = view.document();
        let host = view.element();
        let SwitchState { checked, disabled } = *view.state();
        doc.set_bool_attr(host, "aria-checked", checked);
        doc.toggle_attr(host, "data-checked", checked);
        doc.set_attr(host, "data-state", if checked { "checked" } else { "unchecked" });
        doc.toggle_attr(host, "data-disabled", disabled);
        if disabled {
            doc.set_attr(host, "aria-disabled", "true");
        } else {
            doc.remove_attr(host, "aria-disabled");
        }
        if let Some(thumb) = self.thumb {
            doc.set_attr(thumb, "data-state", if checked { "checked" } else { "unchecked" });
        }
        if let Some(input) = self.input {
            doc.toggle_attr(input, "checked", checked);
            doc.toggle_attr(input, "disabled", disabled);
        }
    }
}

impl Widget<Switch> {
    pub fn is_checked(&self) -> bool {
        self.state().checked
    }

    pub fn is_disabled(&self) -> bool {
        self.state().disabled
    }

    /// Set the checked state. Unchanged values do nothing.
    ///
    /// Programmatic changes apply even while disabled.
    pub fn set_checked(&self, checked: bool) {
        if self.is_checked() == checked {
            return;
        }
        self.set_state(SwitchStatePatch::default().checked(checked));
        self.dispatch(EventName::Change, json!({ "checked": checked }));
    }

    pub fn toggle(&self) {
        self.set_checked(!self.is_checked());
    }

    pub fn set_disabled(&self, disabled: bool) {
        if self.is_disabled() == disabled {
            return;
        }
        self.set_state(SwitchStatePatch::default().disabled(disabled));
    }

    /// The generated hidden input, when `name` is configured.
    pub fn input(&self) -> Option<NodeId> {
        self.component().input
    }

    fn toggle_from_user(&self) {
        if !self.is_disabled() {
            self.toggle();
        }
    }
}

pub fn create_switch(doc: &Document, element: NodeId, overrides: SwitchConfigPatch) -> Result<Widget<Switch>, Error> {
    Widget::create(doc, element, overrides)
}

pub fn create_switch_with_hooks(
    doc: &Document,
    element: NodeId,
    overrides: SwitchConfigPatch,
    hooks: Hooks<SwitchState>,
) -> Result<Widget<Switch>, Error> {
    Widget::create_with_hooks(doc, element, overrides, hooks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{handler, Key, ListenerOptions};
    use crate::testing::Pilot;
    use std::cell::Cell;
    use std::rc::Rc;

    fn host(doc: &Document, builder: ElementBuilder) -> NodeId {
        builder.attr("data-coral-switch", "").append_to(doc, doc.body())
    }

    fn count_changes(doc: &Document, node: NodeId) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        doc.add_event_listener(
            node,
            "coral:switch:change",
            handler(move |_| c.set(c.get() + 1)),
            ListenerOptions::default(),
        );
        count
    }

    #[test]
    fn set_checked_twice_dispatches_once() {
        let doc = Document::new();
        let el = host(&doc, ElementBuilder::new("button"));
        let changes = count_changes(&doc, el);
        let w = create_switch(&doc, el, Default::default()).unwrap();
        w.set_checked(true);
        w.set_checked(true);
        assert_eq!(changes.get(), 1);
        assert_eq!(doc.attr(el, "aria-checked").as_deref(), Some("true"));
        assert!(doc.has_attr(el, "data-checked"));
    }

    #[test]
    fn markup_fallback_applies_only_when_not_passed() {
        let doc = Document::new();
        let el = host(&doc, ElementBuilder::new("button").attr("aria-checked", "true"));
        let w = create_switch(&doc, el, Default::default()).unwrap();
        assert!(w.is_checked());

        let other = host(&doc, ElementBuilder::new("button").attr("data-checked", ""));
        let w = create_switch(&doc, other, SwitchConfigPatch::default().default_checked(false)).unwrap();
        assert!(!w.is_checked());
    }

    #[test]
    fn hidden_input_lifecycle() {
        let doc = Document::new();
        let el = host(&doc, ElementBuilder::new("button"));
        let w = create_switch(&doc, el, SwitchConfigPatch::default().name(Some("wifi".into()))).unwrap();
        let input = w.input().unwrap();
        assert_eq!(doc.attr(input, "name").as_deref(), Some("wifi"));
        assert_eq!(doc.attr(input, "value").as_deref(), Some("on"));
        w.toggle();
        assert!(doc.has_attr(input, "checked"));
        w.destroy();
        assert!(!doc.contains(input));
        assert!(doc.contains(el));
    }

    #[test]
    fn user_input_respects_disabled() {
        let doc = Document::new();
        let el = host(&doc, ElementBuilder::new("button").attr("data-disabled", ""));
        let w = create_switch(&doc, el, Default::default()).unwrap();
        let pilot = Pilot::new(&doc);
        pilot.click(el);
        assert!(!w.is_checked());
        w.set_checked(true);
        assert!(w.is_checked());

        w.set_disabled(false);
        doc.focus(el);
        pilot.press_key(Key::Space);
        assert!(!w.is_checked());
        pilot.press_key(Key::Enter);
        assert!(w.is_checked());
    }

    #[test]
    fn generated_host_id_is_removed_on_destroy() {
        let doc = Document::new();
        let el = host(&doc, ElementBuilder::new("button"));
        let w = create_switch(&doc, el, Default::default()).unwrap();
        assert_eq!(doc.attr(el, "id").as_deref(), Some("switch-1"));
        w.destroy();
        assert!(!doc.has_attr(el, "id"));
    }
}
