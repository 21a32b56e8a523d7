//! # coral-runtime
//!
//! The shared component runtime behind coral's headless UI primitives.
//!
//! Every widget (accordion, dialog, switch, toast, ...) is a [`Component`] driven by a
//! [`Widget`] handle. The runtime owns the parts every widget needs and none should
//! reimplement: configuration resolution, a reactive state store, tracked event
//! binding, ARIA wiring, focus containment, reference-counted scroll locking and the
//! `coral:<kind>:<event>` dispatch convention.
//!
//! Widgets run against an in-memory [`Document`]: an arena DOM with selector queries,
//! DOM-style event propagation and a virtual clock for timers.
//!
//! ## Core Systems
//!
//! - **[`dom`]**: Slotmap-backed element arena, selector engine, `ElementBuilder`
//! - **[`event`]**: Events, propagation, listener table, typed event names
//! - **[`document`]**: Document handle tying DOM, listeners, focus and timers together
//! - **[`timer`]**: Virtual-clock timer queue
//! - **[`runtime`]**: Component trait, widget lifecycle, store, hooks, focus trap, scroll lock, factory
//! - **[`widgets`]**: Built-in widgets: Accordion, Switch, Dialog, Drawer, Dropdown, Toast, RangeSlider
//! - **[`testing`]**: `Pilot` input driver and HTML snapshots

extern crate self as coral_runtime;

// Foundation
pub mod error;
pub mod timer;

// Host model
pub mod document;
pub mod dom;
pub mod event;

// Component runtime
pub mod runtime;
pub mod widgets;

// Test support
pub mod testing;

pub use coral_runtime_macros::{html, Patch};

pub use document::Document;
pub use error::Error;
pub use runtime::{Component, Hooks, Widget};
pub use runtime::store::Patch;
pub use widgets::init_components;
