//! DOM arena: slotmap-backed element tree with selector queries.

pub mod builder;
pub mod node;
pub mod query;
pub mod selector;
pub mod tree;

pub use builder::ElementBuilder;
pub use node::{ElementData, NodeId, Rect};
pub use tree::Dom;
