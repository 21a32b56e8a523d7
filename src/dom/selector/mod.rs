//! Selector engine: logos tokenizer, recursive-descent parser, selector AST.
//!
//! Supports the subset widgets and factories need: type, `*`, `#id`, `.class`,
//! `[attr]`, `[attr=value]`, descendant and `>` combinators, and comma lists.

pub mod model;
pub mod parser;
pub mod tokenizer;

pub use model::{Combinator, CompoundSelector, Selector, SelectorComponent, SelectorList, SelectorPart};
pub use parser::{parse_selector_list, SelectorError};
