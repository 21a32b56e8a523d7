//! Test support: Pilot, snapshot helpers.
//!
//! Use the [`Pilot`] to drive a [`Document`](crate::document::Document) the way a
//! user would. Use [`outer_html`] to capture a subtree as text for snapshot-style
//! assertions.

pub mod pilot;
pub mod snapshot;

pub use pilot::Pilot;
pub use snapshot::outer_html;
