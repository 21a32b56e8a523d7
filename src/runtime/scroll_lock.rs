//! Reference-counted body scroll lock.
//!
//! Any number of widgets may hold the lock at once (stacked dialogs, a drawer
//! opened from a dialog). The first holder saves the body's `overflow` and sets
//! it to `hidden`; only the last release restores it. The coordinator lives on the
//! [`Document`], so each document (and each test) starts from a clean count, and
//! [`Document::reset_scroll_lock`] drops every outstanding hold at once.

use std::cell::{Cell, RefCell};

use crate::document::{Document, WeakDocument};
use crate::dom::{Dom, NodeId};

/// Lock state owned by a document.
#[derive(Debug, Default)]
pub struct ScrollLock {
    holders: Cell<usize>,
    generation: Cell<u64>,
    saved_overflow: RefCell<Option<String>>,
}

impl ScrollLock {
    pub fn holders(&self) -> usize {
        self.holders.get()
    }

    pub fn is_locked(&self) -> bool {
        self.holders.get() > 0
    }

    /// Add a holder. Returns the generation the hold belongs to.
    pub(crate) fn acquire(&self, dom: &mut Dom, body: NodeId) -> u64 {
        if self.holders.get() == 0 {
            let current = dom.get(body).and_then(|b| b.style("overflow")).map(str::to_owned);
            *self.saved_overflow.borrow_mut() = current;
            dom.set_style(body, "overflow", "hidden");
        }
        self.holders.set(self.holders.get() + 1);
        self.generation.get()
    }

    /// Drop a holder from `generation`. Holds from before a reset are ignored.
    pub(crate) fn release(&self, dom: &mut Dom, body: NodeId, generation: u64) -> bool {
        if generation != self.generation.get() || self.holders.get() == 0 {
            return false;
        }
        self.holders.set(self.holders.get() - 1);
        if self.holders.get() == 0 {
            self.restore(dom, body);
        }
        true
    }

    /// Forget all holders and restore the body.
    pub(crate) fn reset(&self, dom: &mut Dom, body: NodeId) {
        if self.holders.get() > 0 {
            self.restore(dom, body);
        }
        self.holders.set(0);
        self.generation.set(self.generation.get() + 1);
    }

    fn restore(&self, dom: &mut Dom, body: NodeId) {
        match self.saved_overflow.borrow_mut().take() {
            Some(previous) => dom.set_style(body, "overflow", &previous),
            None => dom.remove_style(body, "overflow"),
        };
    }
}

/// One hold on the document's scroll lock. Released on drop.
#[must_use = "dropping the guard releases the scroll lock immediately"]
pub struct ScrollLockGuard {
    doc: WeakDocument,
    generation: u64,
    released: bool,
}

impl ScrollLockGuard {
    pub(crate) fn new(doc: WeakDocument, generation: u64) -> Self {
        Self {
            doc,
            generation,
            released: false,
        }
    }

    /// Release explicitly. Equivalent to dropping the guard.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Some(doc) = self.doc.upgrade() {
            doc.release_scroll_lock(self.generation);
        }
    }
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        self.release_inner();
    }
}

impl std::fmt::Debug for ScrollLockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollLockGuard")
            .field("generation", &self.generation)
            .field("released", &self.released)
            .finish()
    }
}

impl Document {
    /// Take a hold on the body scroll lock.
    pub fn lock_scroll(&self) -> ScrollLockGuard {
        let generation = self.with_scroll_lock(|lock, dom, body| lock.acquire(dom, body));
        ScrollLockGuard::new(self.downgrade(), generation)
    }

    pub(crate) fn release_scroll_lock(&self, generation: u64) {
        self.with_scroll_lock(|lock, dom, body| lock.release(dom, body, generation));
    }

    /// Whether any holder currently locks scrolling.
    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_lock().is_locked()
    }

    pub fn scroll_lock_holders(&self) -> usize {
        self.scroll_lock().holders()
    }

    /// Drop every hold and restore the body. Outstanding guards become inert.
    pub fn reset_scroll_lock(&self) {
        self.with_scroll_lock(|lock, dom, body| lock.reset(dom, body));
    }
}
