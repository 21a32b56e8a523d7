//! Event system: DOM-style events, listener registry, input types, typed names.

pub mod types;
pub mod input;
pub mod listener;
pub mod names;

pub use types::{handler, Event, EventTarget, Handler};
pub use input::{Key, Modifiers, MouseButton, PointerInfo};
pub use listener::{ListenerId, ListenerOptions, ListenerTable};
pub use names::{event_type, CoralEvent, EventName, WidgetKind};
