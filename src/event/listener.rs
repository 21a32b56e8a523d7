//! Listener table: per-document registry of `(target, type, handler)` entries.
//!
//! Mirrors `addEventListener` semantics: registering the same handler (by
//! identity) for the same target and type twice is a no-op, listeners on a target
//! run in registration order, and `once` listeners unregister before they run.

use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};

use super::types::{EventTarget, Handler};
use crate::dom::NodeId;

new_key_type! {
    /// Handle to a registered listener.
    pub struct ListenerId;
}

/// Options for [`ListenerTable::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListenerOptions {
    /// Remove the listener after its first invocation.
    pub once: bool,
}

impl ListenerOptions {
    pub fn once() -> Self {
        Self { once: true }
    }
}

struct Registration {
    target: EventTarget,
    event_type: String,
    handler: Handler,
    once: bool,
    seq: u64,
}

/// A listener selected for one dispatch step.
pub(crate) struct Invocation {
    pub id: ListenerId,
    pub handler: Handler,
    pub once: bool,
}

/// All listeners of a document.
#[derive(Default)]
pub struct ListenerTable {
    entries: SlotMap<ListenerId, Registration>,
    next_seq: u64,
}

impl ListenerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Returns the existing id when the same handler is
    /// already registered for this target and type.
    pub fn add(
        &mut self,
        target: EventTarget,
        event_type: &str,
        handler: Handler,
        options: ListenerOptions,
    ) -> ListenerId {
        if let Some(existing) = self.find(target, event_type, &handler) {
            return existing;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(Registration {
            target,
            event_type: event_type.to_owned(),
            handler,
            once: options.once,
            seq,
        })
    }

    fn find(&self, target: EventTarget, event_type: &str, handler: &Handler) -> Option<ListenerId> {
        self.entries
            .iter()
            .find(|(_, r)| r.target == target && r.event_type == event_type && Rc::ptr_eq(&r.handler, handler))
            .map(|(id, _)| id)
    }

    /// Unregister by target, type and handler identity.
    pub fn remove(&mut self, target: EventTarget, event_type: &str, handler: &Handler) -> Option<ListenerId> {
        let id = self.find(target, event_type, handler)?;
        self.entries.remove(id);
        Some(id)
    }

    /// Unregister by id. Returns `false` if it was already gone.
    pub fn remove_id(&mut self, id: ListenerId) -> bool {
        self.entries.remove(id).is_some()
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.entries.contains_key(id)
    }

    /// Drop every listener attached to one of `nodes`. Returns how many were removed.
    pub fn purge_nodes(&mut self, nodes: &[NodeId]) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, r| !matches!(r.target, EventTarget::Node(n) if nodes.contains(&n)));
        before - self.entries.len()
    }

    /// Listeners for one target and type, in registration order.
    pub(crate) fn invocations(&self, target: EventTarget, event_type: &str) -> Vec<Invocation> {
        let mut matching: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, r)| r.target == target && r.event_type == event_type)
            .map(|(id, r)| (r.seq, id, r.handler.clone(), r.once))
            .collect();
        matching.sort_by_key(|(seq, ..)| *seq);
        matching
            .into_iter()
            .map(|(_, id, handler, once)| Invocation { id, handler, once })
            .collect()
    }

    /// Number of listeners on `target` (any type).
    pub fn count_for(&self, target: EventTarget) -> usize {
        self.entries.values().filter(|r| r.target == target).count()
    }

    /// Number of listeners on `target` for `event_type`.
    pub fn count_for_type(&self, target: EventTarget, event_type: &str) -> usize {
        self.entries
            .values()
            .filter(|r| r.target == target && r.event_type == event_type)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
