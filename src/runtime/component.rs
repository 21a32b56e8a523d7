//! The `Component` trait and the two views the runtime hands to it.
//!
//! Construction is two-phase. [`Component::setup_aria`] receives a [`Setup`] with the
//! resolved config and initial state and returns the component value itself, with
//! every cached part already in place. Only then does the runtime wrap it in a
//! [`Widget`] and call [`Component::bind_events`]. A component can therefore never
//! observe itself half-initialised, and listeners can never be attached during the
//! structural phase (`Setup` has no listener API).

use std::fmt;

use crate::document::Document;
use crate::dom::{ElementBuilder, NodeId};
use crate::error::Error;
use crate::event::WidgetKind;
use crate::runtime::attrs;
use crate::runtime::config::{ConfigPatch, ConfigWarning};
use crate::runtime::context;
use crate::runtime::store::Patch;
use crate::runtime::widget::Widget;

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// Behaviour of one widget kind.
///
/// Required: defaults, initial state, structural setup, event binding. Everything
/// else has a no-op default.
pub trait Component: Sized + 'static {
    type Config: Patch + Clone + fmt::Debug + 'static;
    type State: Patch + Clone + fmt::Debug + 'static;

    /// Drives marker/part attributes, id prefixes and event names.
    const KIND: WidgetKind;

    fn default_config() -> Self::Config;

    fn initial_state(config: &Self::Config) -> Self::State;

    /// Configuration implied by the host's markup. Consulted for fields the caller
    /// did not pass.
    fn config_from_dom(_doc: &Document, _element: NodeId) -> ConfigPatch<Self> {
        Default::default()
    }

    /// Repair invalid combinations in place, one warning per repaired field.
    fn validate_config(_config: &mut Self::Config) -> Vec<ConfigWarning> {
        Vec::new()
    }

    /// Assign ids and ARIA relationships, cache parts, and build the component.
    fn setup_aria(setup: &mut Setup<'_, Self>) -> Result<Self, Error>;

    /// Attach listeners. Runs once, right after setup.
    fn bind_events(widget: &Widget<Self>);

    /// Sync the DOM with state and config. Must be idempotent.
    fn render(&self, _view: &RenderView<'_, Self>) {}

    /// Runs after the first render, before the `init` event.
    fn on_ready(_widget: &Widget<Self>) {}

    /// Runs after `Widget::update` stores the new config, before the re-render.
    /// State that depends on config should be brought back in range here.
    fn on_config_change(_widget: &Widget<Self>) {}

    /// Widget-specific cleanup. Runs during `destroy`, before the runtime removes
    /// listeners, timers and generated nodes.
    fn teardown(&self, _widget: &Widget<Self>) {}
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

/// Nodes and ids created during setup, removed again on destroy.
#[derive(Debug, Default)]
pub(crate) struct Generated {
    pub ids: Vec<(NodeId, String)>,
    pub nodes: Vec<NodeId>,
}

/// Structural access to the host during [`Component::setup_aria`].
pub struct Setup<'a, C: Component> {
    doc: &'a Document,
    element: NodeId,
    config: &'a C::Config,
    state: &'a C::State,
    generated: Generated,
}

impl<'a, C: Component> Setup<'a, C> {
    pub(crate) fn new(doc: &'a Document, element: NodeId, config: &'a C::Config, state: &'a C::State) -> Self {
        Self {
            doc,
            element,
            config,
            state,
            generated: Generated::default(),
        }
    }

    pub fn document(&self) -> &Document {
        self.doc
    }

    pub fn element(&self) -> NodeId {
        self.element
    }

    pub fn config(&self) -> &C::Config {
        self.config
    }

    pub fn state(&self) -> &C::State {
        self.state
    }

    /// Every `data-coral-<kind>-<part>` owned by this widget, in document order.
    pub fn parts(&self, part: &str) -> Vec<NodeId> {
        context::owned_parts(self.doc, self.element, C::KIND, part)
    }

    /// Parts of this widget inside `scope` (an item, say).
    pub fn parts_within(&self, scope: NodeId, part: &str) -> Vec<NodeId> {
        self.parts(part)
            .into_iter()
            .filter(|&n| self.doc.is_within(scope, n))
            .collect()
    }

    pub fn part(&self, part: &str) -> Option<NodeId> {
        self.parts(part).into_iter().next()
    }

    /// Like [`Setup::part`], failing with [`Error::MissingPart`].
    pub fn require_part(&self, part: &'static str) -> Result<NodeId, Error> {
        self.part(part).ok_or(Error::MissingPart { kind: C::KIND, part })
    }

    /// The node's id, generating `<prefix>-<n>` if it has none.
    pub fn ensure_id(&mut self, node: NodeId, prefix: &str) -> String {
        let (id, created) = attrs::ensure_id(self.doc, node, prefix);
        if created {
            self.generated.ids.push((node, id.clone()));
        }
        id
    }

    pub fn set_attr(&self, node: NodeId, name: &str, value: impl AsRef<str>) {
        self.doc.set_attr(node, name, value);
    }

    /// Set `name` only when the author did not.
    pub fn set_attr_default(&self, node: NodeId, name: &str, value: impl AsRef<str>) {
        if !self.doc.has_attr(node, name) {
            self.doc.set_attr(node, name, value);
        }
    }

    /// Build an auxiliary node under `parent`. It is removed on destroy.
    pub fn create_element(&mut self, parent: NodeId, builder: ElementBuilder) -> NodeId {
        let node = builder.append_to(self.doc, parent);
        self.generated.nodes.push(node);
        node
    }

    /// Undo everything this setup created. Used when setup fails.
    pub(crate) fn rollback(self) {
        let doc = self.doc;
        remove_generated(doc, self.generated);
    }

    pub(crate) fn finish(self) -> Generated {
        self.generated
    }
}

/// Remove generated nodes, and generated ids that still hold their value.
pub(crate) fn remove_generated(doc: &Document, generated: Generated) {
    for node in generated.nodes {
        doc.remove_node(node);
    }
    for (node, id) in generated.ids {
        if doc.attr(node, "id").as_deref() == Some(id.as_str()) {
            doc.remove_attr(node, "id");
        }
    }
}

// ---------------------------------------------------------------------------
// RenderView
// ---------------------------------------------------------------------------

/// What [`Component::render`] may read: the document, host, config and state.
pub struct RenderView<'a, C: Component> {
    pub(crate) doc: &'a Document,
    pub(crate) element: NodeId,
    pub(crate) config: &'a C::Config,
    pub(crate) state: &'a C::State,
}

impl<'a, C: Component> RenderView<'a, C> {
    pub fn document(&self) -> &Document {
        self.doc
    }

    pub fn element(&self) -> NodeId {
        self.element
    }

    pub fn config(&self) -> &C::Config {
        self.config
    }

    pub fn state(&self) -> &C::State {
        self.state
    }

    /// `data-state="open|closed"`.
    pub fn set_open_state(&self, node: NodeId, open: bool) {
        self.doc
            .set_attr(node, "data-state", if open { "open" } else { "closed" });
    }
}
