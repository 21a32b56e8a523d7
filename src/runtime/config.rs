//! Configuration resolution: `explicit ?? markup ?? default`, then validation.

use std::fmt;

use crate::document::Document;
use crate::dom::NodeId;
use crate::runtime::component::Component;
use crate::runtime::store::Patch;

/// Overrides accepted by `C`'s constructors.
pub type ConfigPatch<C> = <<C as Component>::Config as Patch>::Patch;

/// A configuration field that was invalid and has been repaired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub field: &'static str,
    pub message: String,
}

impl ConfigWarning {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// One field's fallback chain.
pub fn resolve_field<T>(explicit: Option<T>, from_markup: Option<T>, default: T) -> T {
    explicit.or(from_markup).unwrap_or(default)
}

/// Resolve `C`'s configuration for `element` without constructing a widget.
///
/// Every repair made by validation is logged once and returned.
pub fn resolve_config<C: Component>(
    doc: &Document,
    element: NodeId,
    overrides: ConfigPatch<C>,
) -> (C::Config, Vec<ConfigWarning>) {
    let from_markup = C::config_from_dom(doc, element);
    let merged = <C::Config as Patch>::overlay(overrides, from_markup);
    let mut config = C::default_config().patched(merged);
    let warnings = C::validate_config(&mut config);
    log_warnings(C::KIND.as_str(), &warnings);
    (config, warnings)
}

/// Re-validate after `update` and log the repairs.
pub(crate) fn revalidate<C: Component>(config: &mut C::Config) -> Vec<ConfigWarning> {
    let warnings = C::validate_config(config);
    log_warnings(C::KIND.as_str(), &warnings);
    warnings
}

fn log_warnings(widget: &str, warnings: &[ConfigWarning]) {
    for warning in warnings {
        tracing::warn!(widget, field = warning.field, "{}", warning.message);
    }
}
