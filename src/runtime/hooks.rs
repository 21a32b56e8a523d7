//! Caller-supplied lifecycle callbacks.
//!
//! Every hook runs before the custom DOM event for the same transition, so a hook
//! can prepare anything a `coral:<kind>:<event>` listener later observes.

use std::fmt;
use std::rc::Rc;

use crate::event::Event;

type Callback = Rc<dyn Fn()>;
type StateCallback<S> = Rc<dyn Fn(&S)>;
type EventCallback = Rc<dyn Fn(&Event)>;

/// Transitions that have a plain `Fn()` hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleHook {
    Init,
    Mount,
    Unmount,
    Open,
    Close,
    Destroy,
}

/// Hooks that see, and may cancel, a user-initiated trigger event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptHook {
    EscapeKeyDown,
    InteractOutside,
}

/// Optional callbacks attached to one widget instance.
///
/// ```ignore
/// let hooks = Hooks::new()
///     .on_open(|| println!("opened"))
///     .on_escape_key_down(|ev| ev.prevent_default());
/// ```
pub struct Hooks<S> {
    on_init: Option<Callback>,
    on_mount: Option<Callback>,
    on_unmount: Option<Callback>,
    on_open: Option<Callback>,
    on_close: Option<Callback>,
    on_destroy: Option<Callback>,
    on_state_change: Option<StateCallback<S>>,
    on_escape_key_down: Option<EventCallback>,
    on_interact_outside: Option<EventCallback>,
}

impl<S> Hooks<S> {
    pub fn new() -> Self {
        Self {
            on_init: None,
            on_mount: None,
            on_unmount: None,
            on_open: None,
            on_close: None,
            on_destroy: None,
            on_state_change: None,
            on_escape_key_down: None,
            on_interact_outside: None,
        }
    }

    pub fn on_init(mut self, f: impl Fn() + 'static) -> Self {
        self.on_init = Some(Rc::new(f));
        self
    }

    pub fn on_mount(mut self, f: impl Fn() + 'static) -> Self {
        self.on_mount = Some(Rc::new(f));
        self
    }

    pub fn on_unmount(mut self, f: impl Fn() + 'static) -> Self {
        self.on_unmount = Some(Rc::new(f));
        self
    }

    pub fn on_open(mut self, f: impl Fn() + 'static) -> Self {
        self.on_open = Some(Rc::new(f));
        self
    }

    pub fn on_close(mut self, f: impl Fn() + 'static) -> Self {
        self.on_close = Some(Rc::new(f));
        self
    }

    pub fn on_destroy(mut self, f: impl Fn() + 'static) -> Self {
        self.on_destroy = Some(Rc::new(f));
        self
    }

    /// Called after render and subscribers, with the new snapshot.
    pub fn on_state_change(mut self, f: impl Fn(&S) + 'static) -> Self {
        self.on_state_change = Some(Rc::new(f));
        self
    }

    /// Called with the Escape `keydown`. `prevent_default()` keeps the widget open.
    pub fn on_escape_key_down(mut self, f: impl Fn(&Event) + 'static) -> Self {
        self.on_escape_key_down = Some(Rc::new(f));
        self
    }

    /// Called with the outside `mousedown`. `prevent_default()` keeps the widget open.
    pub fn on_interact_outside(mut self, f: impl Fn(&Event) + 'static) -> Self {
        self.on_interact_outside = Some(Rc::new(f));
        self
    }

    pub(crate) fn lifecycle(&self, hook: LifecycleHook) -> Option<Callback> {
        match hook {
            LifecycleHook::Init => self.on_init.clone(),
            LifecycleHook::Mount => self.on_mount.clone(),
            LifecycleHook::Unmount => self.on_unmount.clone(),
            LifecycleHook::Open => self.on_open.clone(),
            LifecycleHook::Close => self.on_close.clone(),
            LifecycleHook::Destroy => self.on_destroy.clone(),
        }
    }

    pub(crate) fn intercept(&self, hook: InterceptHook) -> Option<EventCallback> {
        match hook {
            InterceptHook::EscapeKeyDown => self.on_escape_key_down.clone(),
            InterceptHook::InteractOutside => self.on_interact_outside.clone(),
        }
    }

    pub(crate) fn state_change(&self) -> Option<StateCallback<S>> {
        self.on_state_change.clone()
    }
}

impl<S> Default for Hooks<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for Hooks<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set: Vec<&str> = [
            ("on_init", self.on_init.is_some()),
            ("on_mount", self.on_mount.is_some()),
            ("on_unmount", self.on_unmount.is_some()),
            ("on_open", self.on_open.is_some()),
            ("on_close", self.on_close.is_some()),
            ("on_destroy", self.on_destroy.is_some()),
            ("on_state_change", self.on_state_change.is_some()),
            ("on_escape_key_down", self.on_escape_key_down.is_some()),
            ("on_interact_outside", self.on_interact_outside.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect();
        f.debug_struct("Hooks").field("set", &set).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn empty_hooks_return_none() {
        let hooks: Hooks<()> = Hooks::new();
        assert!(hooks.lifecycle(LifecycleHook::Open).is_none());
        assert!(hooks.intercept(InterceptHook::EscapeKeyDown).is_none());
        assert!(hooks.state_change().is_none());
    }

    #[test]
    fn builder_routes_to_matching_slot() {
        let opened = Rc::new(Cell::new(false));
        let opened2 = opened.clone();
        let hooks: Hooks<u8> = Hooks::new().on_open(move || opened2.set(true));
        assert!(hooks.lifecycle(LifecycleHook::Close).is_none());
        if let Some(f) = hooks.lifecycle(LifecycleHook::Open) {
            f();
        }
        assert!(opened.get());
        assert!(format!("{hooks:?}").contains("on_open"));
    }
}
