//! Virtual-clock timer queue.
//!
//! Time is a millisecond counter that only moves when the host advances it, so
//! countdowns and animation delays are deterministic. Timers due at the same
//! instant fire in scheduling order.

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a scheduled timer.
    pub struct TimerId;
}

/// Deferred callback.
pub type TimerCallback = Box<dyn FnOnce()>;

struct Timer {
    due: u64,
    seq: u64,
    callback: TimerCallback,
}

/// Pending timers plus the current virtual time.
#[derive(Default)]
pub struct TimerQueue {
    timers: SlotMap<TimerId, Timer>,
    now: u64,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Schedule `callback` to run `delay_ms` from now.
    pub fn schedule(&mut self, delay_ms: u64, callback: TimerCallback) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.insert(Timer {
            due: self.now.saturating_add(delay_ms),
            seq,
            callback,
        })
    }

    /// Cancel a timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(id).is_some()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Due time of the earliest pending timer.
    pub fn next_due(&self) -> Option<u64> {
        self.timers.values().map(|t| t.due).min()
    }

    /// Remove the earliest timer due at or before `until`, moving the clock to its
    /// due time. The caller runs the callback without holding the queue borrowed.
    pub fn pop_due(&mut self, until: u64) -> Option<TimerCallback> {
        let (id, due) = self
            .timers
            .iter()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(id, t)| (id, t.due))?;
        let timer = self.timers.remove(id)?;
        self.now = self.now.max(due);
        Some(timer.callback)
    }

    /// Move the clock forward to `time` (never backwards).
    pub fn advance_to(&mut self, time: u64) {
        self.now = self.now.max(time);
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Drop every pending timer without running it.
    pub fn clear(&mut self) {
        self.timers.clear();
    }
}
