//! The per-widget registry of listeners attached through the runtime.
//!
//! Every listener a widget adds is recorded here, including those bound under a
//! legacy `"type-suffix"` key, so `destroy` can remove them all in one sweep.

use std::rc::Rc;

use crate::event::{EventTarget, Handler, ListenerId};

/// One listener the widget attached.
#[derive(Clone)]
pub struct TrackedListener {
    pub target: EventTarget,
    pub event_type: String,
    pub handler: Handler,
    pub id: ListenerId,
    /// Set for listeners bound with a `"type-suffix"` key.
    pub key: Option<String>,
}

impl std::fmt::Debug for TrackedListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackedListener")
            .field("target", &self.target)
            .field("event_type", &self.event_type)
            .field("id", &self.id)
            .field("key", &self.key)
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct TrackedListeners {
    entries: Vec<TrackedListener>,
}

impl TrackedListeners {
    pub fn push(&mut self, entry: TrackedListener) {
        self.entries.push(entry);
    }

    /// Remove every entry for this target, type and handler identity.
    pub fn remove_matching(&mut self, target: EventTarget, event_type: &str, handler: &Handler) -> Vec<TrackedListener> {
        let (removed, kept) = std::mem::take(&mut self.entries).into_iter().partition(|e| {
            e.target == target && e.event_type == event_type && Rc::ptr_eq(&e.handler, handler)
        });
        self.entries = kept;
        removed
    }

    /// Remove the entries bound under `key`.
    pub fn take_keyed(&mut self, key: &str) -> Vec<TrackedListener> {
        let (removed, kept) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| e.key.as_deref() == Some(key));
        self.entries = kept;
        removed
    }

    pub fn drain(&mut self) -> Vec<TrackedListener> {
        std::mem::take(&mut self.entries)
    }

    pub fn ids(&self) -> impl Iterator<Item = ListenerId> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Event type encoded in a legacy handler key.
///
/// `"click-trigger3"` yields `"click"`; a key without `-` is used whole.
pub fn parse_handler_key(key: &str) -> &str {
    match key.split_once('-') {
        Some((event_type, _)) if !event_type.is_empty() => event_type,
        _ => key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Dom, ElementData};
    use crate::event::{handler, ListenerOptions, ListenerTable};

    #[test]
    fn parses_keys() {
        assert_eq!(parse_handler_key("click-trigger-3"), "click");
        assert_eq!(parse_handler_key("keydown"), "keydown");
        assert_eq!(parse_handler_key(""), "");
        assert_eq!(parse_handler_key("-odd"), "-odd");
    }

    fn entry(table: &mut ListenerTable, target: EventTarget, ty: &str, h: &Handler, key: Option<&str>) -> TrackedListener {
        let id = table.add(target, ty, h.clone(), ListenerOptions::default());
        TrackedListener {
            target,
            event_type: ty.into(),
            handler: h.clone(),
            id,
            key: key.map(str::to_owned),
        }
    }

    #[test]
    fn remove_matching_filters_by_identity_and_target() {
        let mut dom = Dom::new();
        let a = dom.create(ElementData::new("div"));
        let b = dom.create(ElementData::new("div"));
        let mut table = ListenerTable::new();
        let h = handler(|_| {});
        let other = handler(|_| {});

        let mut tracked = TrackedListeners::default();
        tracked.push(entry(&mut table, a.into(), "click", &h, None));
        tracked.push(entry(&mut table, b.into(), "click", &h, None));
        tracked.push(entry(&mut table, a.into(), "click", &other, None));

        let removed = tracked.remove_matching(a.into(), "click", &h);
        assert_eq!(removed.len(), 1);
        assert_eq!(tracked.len(), 2);
    }

    #[test]
    fn keyed_entries_are_taken_by_key() {
        let mut table = ListenerTable::new();
        let h = handler(|_| {});
        let mut tracked = TrackedListeners::default();
        tracked.push(entry(&mut table, EventTarget::Document, "keydown", &h, Some("keydown-nav")));
        tracked.push(entry(&mut table, EventTarget::Window, "resize", &h, None));

        assert!(tracked.take_keyed("missing").is_empty());
        assert_eq!(tracked.take_keyed("keydown-nav").len(), 1);
        assert_eq!(tracked.drain().len(), 1);
        assert!(tracked.is_empty());
    }
}
