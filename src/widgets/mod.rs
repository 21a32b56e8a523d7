//! Built-in widgets: Accordion, Switch, Dialog, Drawer, Dropdown, Toast, RangeSlider.

pub mod accordion;
pub mod dialog;
pub mod drawer;
pub mod dropdown;
pub mod modal;
pub mod range_slider;
pub mod switch;
pub mod toast;

pub use accordion::Accordion;
pub use dialog::Dialog;
pub use drawer::Drawer;
pub use dropdown::Dropdown;
pub use modal::{Modal, ModalState};
pub use range_slider::RangeSlider;
pub use switch::Switch;
pub use toast::Toast;

use crate::document::Document;
use crate::runtime::{AnyWidget, Registry};

/// Every built-in widget, registered under its marker selector.
pub fn registry() -> Registry {
    Registry::new()
        .register_kind::<Accordion>()
        .register_kind::<Switch>()
        .register_kind::<Dialog>()
        .register_kind::<Drawer>()
        .register_kind::<Dropdown>()
        .register_kind::<Toast>()
        .register_kind::<RangeSlider>()
}

/// Construct every built-in widget found in `doc`.
///
/// Elements that already carry an instance are skipped, so calling this again
/// after adding markup only initialises the new elements. The document keeps
/// the instances alive until they are destroyed.
pub fn init_components(doc: &Document) -> Vec<Box<dyn AnyWidget>> {
    registry().init_all(doc)
}
