//! Dialog: a modal (or non-modal) window over the page.

use crate::document::Document;
use crate::dom::NodeId;
use crate::error::Error;
use crate::event::WidgetKind;
use crate::runtime::config::ConfigPatch;
use crate::runtime::{Component, Hooks, RenderView, Setup, Widget};
use crate::widgets::modal::{self, Modal, ModalMarkup, ModalOptions, ModalParts, ModalState};
use crate::Patch;

#[derive(Debug, Clone, PartialEq, Patch)]
pub struct DialogConfig {
    pub default_open: bool,
    pub modal: bool,
    pub close_on_escape: bool,
    pub close_on_outside_click: bool,
    pub lock_scroll: bool,
    pub trap_focus: bool,
}

pub struct Dialog {
    parts: ModalParts,
}

impl Component for Dialog {
    type Config = DialogConfig;
    type State = ModalState;
    const KIND: WidgetKind = WidgetKind::Dialog;

    fn default_config() -> DialogConfig {
        DialogConfig {
            default_open: false,
            modal: true,
            close_on_escape: true,
            close_on_outside_click: true,
            lock_scroll: true,
            trap_focus: true,
        }
    }

    fn initial_state(config: &DialogConfig) -> ModalState {
        modal::initial_state(config.default_open)
    }

    fn config_from_dom(doc: &Document, element: NodeId) -> ConfigPatch<Self> {
        let markup = ModalMarkup::read(doc, element);
        DialogConfigPatch {
            default_open: markup.default_open,
            modal: markup.modal,
            close_on_escape: markup.close_on_escape,
            close_on_outside_click: markup.close_on_outside_click,
            lock_scroll: markup.lock_scroll,
            trap_focus: markup.trap_focus,
        }
    }

    fn setup_aria(setup: &mut Setup<'_, Self>) -> Result<Self, Error> {
        let modal = setup.config().modal;
        Ok(Dialog {
            parts: ModalParts::setup(setup, modal)?,
        })
    }

    fn bind_events(widget: &Widget<Self>) {
        modal::bind_modal(widget);
    }

    fn render(&self, view: &RenderView<'_, Self>) {
        self.parts.render(view, view.state().open);
    }

    fn on_ready(widget: &Widget<Self>) {
        modal::ready_modal(widget);
    }
}

impl Modal for Dialog {
    fn modal_parts(&self) -> &ModalParts {
        &self.parts
    }

    /// A non-modal dialog neither locks scroll nor traps focus.
    fn options(config: &DialogConfig) -> ModalOptions {
        ModalOptions {
            modal: config.modal,
            close_on_escape: config.close_on_escape,
            close_on_outside_click: config.close_on_outside_click,
            lock_scroll: config.modal && config.lock_scroll,
            trap_focus: config.modal && config.trap_focus,
        }
    }
}

pub fn create_dialog(doc: &Document, element: NodeId, overrides: DialogConfigPatch) -> Result<Widget<Dialog>, Error> {
    Widget::create(doc, element, overrides)
}

pub fn create_dialog_with_hooks(
    doc: &Document,
    element: NodeId,
    overrides: DialogConfigPatch,
    hooks: Hooks<ModalState>,
) -> Result<Widget<Dialog>, Error> {
    Widget::create_with_hooks(doc, element, overrides, hooks)
}
