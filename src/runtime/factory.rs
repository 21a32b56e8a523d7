//! Factories, auto-init and the widget registry.

use std::fmt;
use std::marker::PhantomData;

use crate::document::Document;
use crate::dom::NodeId;
use crate::error::Error;
use crate::event::WidgetKind;
use crate::runtime::component::Component;
use crate::runtime::config::ConfigPatch;
use crate::runtime::hooks::Hooks;
use crate::runtime::widget::{AnyWidget, Widget};

/// A host given either directly or as a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRef<'a> {
    Node(NodeId),
    Selector(&'a str),
}

impl From<NodeId> for ElementRef<'_> {
    fn from(node: NodeId) -> Self {
        ElementRef::Node(node)
    }
}

impl<'a> From<&'a str> for ElementRef<'a> {
    fn from(selector: &'a str) -> Self {
        ElementRef::Selector(selector)
    }
}

/// Resolve to a node. A selector takes the first match in document order.
pub fn resolve_element(doc: &Document, target: ElementRef<'_>) -> Result<NodeId, Error> {
    match target {
        ElementRef::Node(node) if doc.contains(node) => Ok(node),
        ElementRef::Node(node) => Err(Error::UnknownNode(node)),
        ElementRef::Selector(selector) => doc
            .query_selector(selector)
            .map_err(|source| Error::invalid_selector(selector, source))?
            .ok_or_else(|| Error::ElementNotFound {
                selector: selector.to_owned(),
            }),
    }
}

/// Constructs `C` instances from a node or selector.
pub struct ComponentFactory<C: Component> {
    _marker: PhantomData<fn() -> C>,
}

impl<C: Component> ComponentFactory<C> {
    pub fn create<'a>(
        &self,
        doc: &Document,
        target: impl Into<ElementRef<'a>>,
        overrides: ConfigPatch<C>,
    ) -> Result<Widget<C>, Error> {
        let element = resolve_element(doc, target.into())?;
        Widget::create(doc, element, overrides)
    }

    pub fn create_with_hooks<'a>(
        &self,
        doc: &Document,
        target: impl Into<ElementRef<'a>>,
        overrides: ConfigPatch<C>,
        hooks: Hooks<C::State>,
    ) -> Result<Widget<C>, Error> {
        let element = resolve_element(doc, target.into())?;
        Widget::create_with_hooks(doc, element, overrides, hooks)
    }
}

impl<C: Component> Clone for ComponentFactory<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: Component> Copy for ComponentFactory<C> {}

impl<C: Component> fmt::Debug for ComponentFactory<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentFactory").field("kind", &C::KIND).finish()
    }
}

pub fn create_component_factory<C: Component>() -> ComponentFactory<C> {
    ComponentFactory {
        _marker: PhantomData,
    }
}

/// Create a `C` on every element matching `selector`, with default config.
///
/// Elements that already host a `C` are skipped. An element whose construction
/// fails is logged and skipped; the rest still initialise.
pub fn auto_init<C: Component>(doc: &Document, selector: &str) -> Result<Vec<Widget<C>>, Error> {
    let elements = doc
        .query_selector_all(selector)
        .map_err(|source| Error::invalid_selector(selector, source))?;
    let mut created = Vec::new();
    for element in elements {
        if doc.has_instance(element, C::KIND) {
            continue;
        }
        match Widget::<C>::create(doc, element, Default::default()) {
            Ok(widget) => created.push(widget),
            Err(err) => tracing::error!(widget = %C::KIND, error = %err, "auto-init skipped element"),
        }
    }
    Ok(created)
}

type InitFn = fn(&Document, &str) -> Result<Vec<Box<dyn AnyWidget>>, Error>;

fn auto_init_boxed<C: Component>(doc: &Document, selector: &str) -> Result<Vec<Box<dyn AnyWidget>>, Error> {
    Ok(auto_init::<C>(doc, selector)?
        .into_iter()
        .map(|w| Box::new(w) as Box<dyn AnyWidget>)
        .collect())
}

struct RegistryEntry {
    selector: String,
    kind: WidgetKind,
    init: InitFn,
}

/// `(selector, widget)` pairs initialised together by [`Registry::init_all`].
#[derive(Default)]
pub struct Registry {
    entries: Vec<RegistryEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `C` under an explicit selector.
    pub fn register<C: Component>(mut self, selector: impl Into<String>) -> Self {
        self.entries.push(RegistryEntry {
            selector: selector.into(),
            kind: C::KIND,
            init: auto_init_boxed::<C>,
        });
        self
    }

    /// Register `C` under its marker selector, `[data-coral-<kind>]`.
    pub fn register_kind<C: Component>(self) -> Self {
        let selector = C::KIND.marker_selector();
        self.register::<C>(selector)
    }

    pub fn kinds(&self) -> Vec<WidgetKind> {
        self.entries.iter().map(|e| e.kind).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every entry once, in registration order.
    ///
    /// An entry with a malformed selector is logged and skipped.
    pub fn init_all(&self, doc: &Document) -> Vec<Box<dyn AnyWidget>> {
        let mut all = Vec::new();
        for entry in &self.entries {
            match (entry.init)(doc, &entry.selector) {
                Ok(widgets) => all.extend(widgets),
                Err(err) => tracing::error!(widget = %entry.kind, error = %err, "auto-init failed"),
            }
        }
        tracing::debug!(widgets = all.len(), "components initialised");
        all
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| (&e.selector, e.kind)))
            .finish()
    }
}
