//! Crate error type.

use crate::dom::selector::SelectorError;
use crate::dom::NodeId;
use crate::event::names::WidgetKind;

/// Errors surfaced to callers.
///
/// Configuration problems are never errors: they are repaired and logged. Operations
/// that are impossible in the current state (closing a closed panel) are silent
/// no-ops. What remains are resolution and context failures, which the caller must
/// handle.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A factory was given a selector that matches nothing.
    #[error("no element matches selector `{selector}`")]
    ElementNotFound { selector: String },

    /// A selector string could not be parsed.
    #[error("invalid selector `{selector}`: {source}")]
    InvalidSelector {
        selector: String,
        #[source]
        source: SelectorError,
    },

    /// A sub-part was used outside the widget it belongs to.
    #[error("{part} must be used inside a `{kind}` widget")]
    MissingContext { kind: WidgetKind, part: String },

    /// A widget's markup lacks a part the widget cannot work without.
    #[error("`{kind}` widget is missing its required `{part}` part")]
    MissingPart { kind: WidgetKind, part: &'static str },

    /// The node id is stale or belongs to another document.
    #[error("node {0:?} does not exist in this document")]
    UnknownNode(NodeId),
}

impl Error {
    pub(crate) fn invalid_selector(selector: &str, source: SelectorError) -> Self {
        Error::InvalidSelector {
            selector: selector.to_owned(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_not_found_names_selector() {
        let err = Error::ElementNotFound {
            selector: "#missing".into(),
        };
        assert_eq!(err.to_string(), "no element matches selector `#missing`");
    }

    #[test]
    fn missing_part_names_kind_and_part() {
        let err = Error::MissingPart {
            kind: WidgetKind::Dialog,
            part: "content",
        };
        assert_eq!(
            err.to_string(),
            "`dialog` widget is missing its required `content` part"
        );
    }

    #[test]
    fn invalid_selector_keeps_source() {
        use std::error::Error as _;
        let err = Error::invalid_selector("div[", SelectorError::UnexpectedEof("expected attribute name".into()));
        assert!(err.to_string().starts_with("invalid selector `div[`"));
        assert!(err.source().is_some());
    }
}
