//! Drawer: a modal panel sliding in from one edge.

use std::fmt;
use std::str::FromStr;

use crate::document::Document;
use crate::dom::NodeId;
use crate::error::Error;
use crate::event::WidgetKind;
use crate::runtime::config::ConfigPatch;
use crate::runtime::{Component, Hooks, RenderView, Setup, Widget};
use crate::widgets::modal::{self, Modal, ModalMarkup, ModalOptions, ModalParts, ModalState};
use crate::Patch;

/// Edge the drawer is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawerSide {
    Left,
    #[default]
    Right,
    Top,
    Bottom,
}

impl DrawerSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrawerSide::Left => "left",
            DrawerSide::Right => "right",
            DrawerSide::Top => "top",
            DrawerSide::Bottom => "bottom",
        }
    }
}

impl fmt::Display for DrawerSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DrawerSide {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s.trim() {
            "left" => Ok(DrawerSide::Left),
            "right" => Ok(DrawerSide::Right),
            "top" => Ok(DrawerSide::Top),
            "bottom" => Ok(DrawerSide::Bottom),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Patch)]
pub struct DrawerConfig {
    pub side: DrawerSide,
    pub default_open: bool,
    pub close_on_escape: bool,
    pub close_on_outside_click: bool,
    pub lock_scroll: bool,
    pub trap_focus: bool,
}

pub struct Drawer {
    parts: ModalParts,
}

impl Component for Drawer {
    type Config = DrawerConfig;
    type State = ModalState;
    const KIND: WidgetKind = WidgetKind::Drawer;

    fn default_config() -> DrawerConfig {
        DrawerConfig {
            side: DrawerSide::Right,
            default_open: false,
            close_on_escape: true,
            close_on_outside_click: true,
            lock_scroll: true,
            trap_focus: true,
        }
    }

    fn initial_state(config: &DrawerConfig) -> ModalState {
        modal::initial_state(config.default_open)
    }

    fn config_from_dom(doc: &Document, element: NodeId) -> ConfigPatch<Self> {
        let markup = ModalMarkup::read(doc, element);
        DrawerConfigPatch {
            side: doc.attr(element, "data-side").and_then(|s| s.parse().ok()),
            default_open: markup.default_open,
            close_on_escape: markup.close_on_escape,
            close_on_outside_click: markup.close_on_outside_click,
            lock_scroll: markup.lock_scroll,
            trap_focus: markup.trap_focus,
        }
    }

    fn setup_aria(setup: &mut Setup<'_, Self>) -> Result<Self, Error> {
        Ok(Drawer {
            parts: ModalParts::setup(setup, true)?,
        })
    }

    fn bind_events(widget: &Widget<Self>) {
        modal::bind_modal(widget);
    }

    fn render(&self, view: &RenderView<'_, Self>) {
        self.parts.render(view, view.state().open);
        view.document()
            .set_attr(self.parts.content, "data-side", view.config().side.as_str());
    }

    fn on_ready(widget: &Widget<Self>) {
        modal::ready_modal(widget);
    }
}

impl Modal for Drawer {
    fn modal_parts(&self) -> &ModalParts {
        &self.parts
    }

    fn options(config: &DrawerConfig) -> ModalOptions {
        ModalOptions {
            modal: true,
            close_on_escape: config.close_on_escape,
            close_on_outside_click: config.close_on_outside_click,
            lock_scroll: config.lock_scroll,
            trap_focus: config.trap_focus,
        }
    }
}

impl Widget<Drawer> {
    pub fn side(&self) -> DrawerSide {
        self.config().side
    }
}

pub fn create_drawer(doc: &Document, element: NodeId, overrides: DrawerConfigPatch) -> Result<Widget<Drawer>, Error> {
    Widget::create(doc, element, overrides)
}

pub fn create_drawer_with_hooks(
    doc: &Document,
    element: NodeId,
    overrides: DrawerConfigPatch,
    hooks: Hooks<ModalState>,
) -> Result<Widget<Drawer>, Error> {
    Widget::create_with_hooks(doc, element, overrides, hooks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementBuilder;
    use crate::event::Key;
    use crate::testing::Pilot;
    use crate::widgets::dialog::create_dialog;

    fn drawer_markup() -> ElementBuilder {
        ElementBuilder::new("aside").attr("data-coral-drawer", "").child(
            ElementBuilder::new("nav")
                .attr("data-coral-drawer-content", "")
                .child(ElementBuilder::new("a").attr("href", "#home").text("Home")),
        )
    }

    #[test]
    fn side_from_markup_and_update() {
        let doc = Document::new();
        let root = drawer_markup().attr("data-side", "left").append_to(&doc, doc.body());
        let w = create_drawer(&doc, root, Default::default()).unwrap();
        assert_eq!(w.side(), DrawerSide::Left);
        assert_eq!(doc.attr(w.content(), "data-side").as_deref(), Some("left"));

        w.update(DrawerConfigPatch::default().side(DrawerSide::Bottom));
        assert_eq!(doc.attr(w.content(), "data-side").as_deref(), Some("bottom"));
    }

    #[test]
    fn unknown_side_falls_back() {
        let doc = Document::new();
        let root = drawer_markup().attr("data-side", "diagonal").append_to(&doc, doc.body());
        let w = create_drawer(&doc, root, Default::default()).unwrap();
        assert_eq!(w.side(), DrawerSide::Right);
    }

    #[test]
    fn drawer_opened_from_dialog_keeps_scroll_locked() {
        let doc = Document::new();
        let dialog_root = ElementBuilder::new("div")
            .attr("data-coral-dialog", "")
            .child(
                ElementBuilder::new("div")
                    .attr("data-coral-dialog-content", "")
                    .child(ElementBuilder::new("button").text("More")),
            )
            .append_to(&doc, doc.body());
        let dialog = create_dialog(&doc, dialog_root, Default::default()).unwrap();
        let drawer_root = drawer_markup().append_to(&doc, doc.body());
        let drawer = create_drawer(&doc, drawer_root, Default::default()).unwrap();

        dialog.open();
        drawer.open();
        let pilot = Pilot::new(&doc);
        // Outside both: only the drawer (topmost) closes.
        pilot.click(doc.body());
        assert!(!drawer.is_open());
        assert!(dialog.is_open());
        assert!(doc.is_scroll_locked());

        pilot.press_key(Key::Escape);
        assert!(!dialog.is_open());
        assert!(!doc.is_scroll_locked());
    }
}
