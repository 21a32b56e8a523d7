//! StateStore<S> and the Patch trait.
//!
//! A store holds one immutable snapshot (`Rc<S>`) at a time. `update` shallow-merges
//! a patch into a clone of the current snapshot and swaps it in, so a snapshot a
//! subscriber received is never mutated afterwards and `Rc::ptr_eq` detects change.
//!
//! Subscribers are notified without holding any borrow on the store, so a
//! subscriber may read the store, update it, or unsubscribe itself or others.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

// ---------------------------------------------------------------------------
// Patch
// ---------------------------------------------------------------------------

/// A struct with a generated partial-update type. Use `#[derive(Patch)]`.
pub trait Patch: Sized {
    /// All-`Option` mirror of `Self`. `None` means "not passed".
    type Patch: Default + Clone + fmt::Debug;

    /// Overwrite every field that is `Some` in `patch`.
    fn apply(&mut self, patch: Self::Patch);

    /// Field-wise `primary.or(fallback)`.
    fn overlay(primary: Self::Patch, fallback: Self::Patch) -> Self::Patch;

    /// `apply` by value.
    fn patched(mut self, patch: Self::Patch) -> Self {
        self.apply(patch);
        self
    }
}

// ---------------------------------------------------------------------------
// StateStore
// ---------------------------------------------------------------------------

type Subscriber<S> = Rc<dyn Fn(&Rc<S>)>;

struct SubscriberList<S> {
    entries: Vec<(u64, Subscriber<S>)>,
}

impl<S> SubscriberList<S> {
    fn contains(&self, id: u64) -> bool {
        self.entries.iter().any(|(i, _)| *i == id)
    }
}

/// Per-instance state container with shallow-merge updates and subscribers.
pub struct StateStore<S> {
    state: RefCell<Rc<S>>,
    subscribers: Rc<RefCell<SubscriberList<S>>>,
    next_id: Cell<u64>,
}

impl<S: Patch + Clone + 'static> StateStore<S> {
    pub fn new(initial: S) -> Self {
        Self {
            state: RefCell::new(Rc::new(initial)),
            subscribers: Rc::new(RefCell::new(SubscriberList {
                entries: Vec::new(),
            })),
            next_id: Cell::new(0),
        }
    }

    /// The current snapshot.
    pub fn get(&self) -> Rc<S> {
        self.state.borrow().clone()
    }

    /// Merge `patch` into a new snapshot and make it current. Does not notify.
    pub fn update(&self, patch: S::Patch) -> Rc<S> {
        let next = Rc::new(S::clone(&self.get()).patched(patch));
        *self.state.borrow_mut() = next.clone();
        next
    }

    /// Call every subscriber with `snapshot`, in subscription order.
    ///
    /// A subscriber removed while this pass runs is skipped.
    pub fn notify(&self, snapshot: &Rc<S>) {
        let pass: Vec<(u64, Subscriber<S>)> = self.subscribers.borrow().entries.clone();
        for (id, subscriber) in pass {
            if !self.subscribers.borrow().contains(id) {
                continue;
            }
            subscriber(snapshot);
        }
    }

    /// `update` then `notify`.
    pub fn set_state(&self, patch: S::Patch) -> Rc<S> {
        let next = self.update(patch);
        self.notify(&next);
        next
    }

    /// Register `f`; it runs on every notification until unsubscribed.
    pub fn subscribe(&self, f: impl Fn(&Rc<S>) + 'static) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.subscribers.borrow_mut().entries.push((id, Rc::new(f)));

        let list = Rc::downgrade(&self.subscribers);
        Subscription {
            unsubscribe: Rc::new(move || {
                if let Some(list) = list.upgrade() {
                    list.borrow_mut().entries.retain(|(i, _)| *i != id);
                }
            }),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().entries.len()
    }

    /// Drop every subscriber.
    pub fn clear(&self) {
        self.subscribers.borrow_mut().entries.clear();
    }
}

impl<S: fmt::Debug> fmt::Debug for StateStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateStore")
            .field("state", &self.state.borrow())
            .field("subscribers", &self.subscribers.borrow().entries.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// Handle returned by [`StateStore::subscribe`].
///
/// Dropping it does not unsubscribe; call [`Subscription::unsubscribe`].
#[derive(Clone)]
pub struct Subscription {
    unsubscribe: Rc<dyn Fn()>,
}

impl Subscription {
    /// Remove the subscriber. Calling it again is a no-op.
    pub fn unsubscribe(&self) {
        (self.unsubscribe)();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Subscription")
    }
}
