//! Typed custom-event names.
//!
//! Every custom event the runtime dispatches is named `coral:<kind>:<event>`. The
//! wire string is produced here and nowhere else.

use std::fmt;

/// The kind of a widget: drives marker attributes, part attributes, generated id
/// prefixes and event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Accordion,
    Dialog,
    Drawer,
    Dropdown,
    RangeSlider,
    Switch,
    Toast,
    /// A widget defined outside this crate. The name must be kebab-case.
    Custom(&'static str),
}

impl WidgetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetKind::Accordion => "accordion",
            WidgetKind::Dialog => "dialog",
            WidgetKind::Drawer => "drawer",
            WidgetKind::Dropdown => "dropdown",
            WidgetKind::RangeSlider => "range-slider",
            WidgetKind::Switch => "switch",
            WidgetKind::Toast => "toast",
            WidgetKind::Custom(name) => name,
        }
    }

    /// Root marker attribute: `data-coral-<kind>`.
    pub fn marker_attribute(&self) -> String {
        format!("data-coral-{}", self.as_str())
    }

    /// Sub-part attribute: `data-coral-<kind>-<part>`.
    pub fn part_attribute(&self, part: &str) -> String {
        format!("data-coral-{}-{}", self.as_str(), part)
    }

    /// Selector matching widget roots: `[data-coral-<kind>]`.
    pub fn marker_selector(&self) -> String {
        format!("[{}]", self.marker_attribute())
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event names shared across widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    Init,
    Mount,
    Unmount,
    Destroy,
    Change,
    Open,
    Close,
    Select,
    Pause,
    Resume,
    ValueCommit,
    EscapeKeyDown,
    InteractOutside,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::Init => "init",
            EventName::Mount => "mount",
            EventName::Unmount => "unmount",
            EventName::Destroy => "destroy",
            EventName::Change => "change",
            EventName::Open => "open",
            EventName::Close => "close",
            EventName::Select => "select",
            EventName::Pause => "pause",
            EventName::Resume => "resume",
            EventName::ValueCommit => "value-commit",
            EventName::EscapeKeyDown => "escape-key-down",
            EventName::InteractOutside => "interact-outside",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `(kind, event)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoralEvent {
    pub kind: WidgetKind,
    pub name: EventName,
}

impl CoralEvent {
    pub const fn new(kind: WidgetKind, name: EventName) -> Self {
        Self { kind, name }
    }

    /// The DOM event type: `coral:<kind>:<event>`.
    pub fn event_type(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CoralEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "coral:{}:{}", self.kind, self.name)
    }
}

/// Shorthand for `CoralEvent::new(kind, name).event_type()`.
pub fn event_type(kind: WidgetKind, name: EventName) -> String {
    CoralEvent::new(kind, name).event_type()
}
