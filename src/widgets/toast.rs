//! Toast: a transient notification with an auto-dismiss countdown.
//!
//! The countdown runs on the document clock. Pausing records how much of it is
//! left, and resuming schedules exactly that remainder. A dismissed toast
//! destroys itself and removes its node once `remove_delay_ms` has passed.

use std::cell::{Cell, RefCell};

use serde_json::{json, Value};

use crate::document::Document;
use crate::dom::{ElementBuilder, NodeId};
use crate::error::Error;
use crate::event::{EventName, WidgetKind};
use crate::runtime::attrs;
use crate::runtime::config::ConfigPatch;
use crate::runtime::{Component, Hooks, LifecycleHook, RenderView, Setup, Widget};
use crate::timer::TimerId;
use crate::Patch;

#[derive(Debug, Clone, PartialEq, Patch)]
pub struct ToastConfig {
    /// Auto-dismiss delay. `0` keeps the toast until dismissed.
    pub duration_ms: u64,
    pub pause_on_hover: bool,
    /// Delay between dismissal and node removal, for exit animations.
    pub remove_delay_ms: u64,
    /// Announce assertively (`role="alert"`) instead of politely.
    pub urgent: bool,
}

#[derive(Debug, Clone, PartialEq, Patch)]
pub struct ToastState {
    pub open: bool,
    pub paused: bool,
}

#[derive(Debug, Default)]
struct Countdown {
    timer: Option<TimerId>,
    started_at: u64,
    remaining: u64,
}

pub struct Toast {
    close: Vec<NodeId>,
    countdown: RefCell<Countdown>,
    paused_by_hover: Cell<bool>,
}

impl Component for Toast {
    type Config = ToastConfig;
    type State = ToastState;
    const KIND: WidgetKind = WidgetKind::Toast;

    fn default_config() -> ToastConfig {
        ToastConfig {
            duration_ms: 5000,
            pause_on_hover: true,
            remove_delay_ms: 200,
            urgent: false,
        }
    }

    fn initial_state(_config: &ToastConfig) -> ToastState {
        ToastState {
            open: true,
            paused: false,
        }
    }

    fn config_from_dom(doc: &Document, element: NodeId) -> ConfigPatch<Self> {
        ToastConfigPatch {
            duration_ms: attrs::number_attr(doc, element, "data-duration"),
            pause_on_hover: attrs::bool_attr(doc, element, "data-pause-on-hover"),
            remove_delay_ms: attrs::number_attr(doc, element, "data-remove-delay"),
            urgent: attrs::bool_attr(doc, element, "data-urgent"),
        }
    }

    fn setup_aria(setup: &mut Setup<'_, Self>) -> Result<Self, Error> {
        let host = setup.element();
        let urgent = setup.config().urgent;
        setup.ensure_id(host, "toast");
        setup.set_attr_default(host, "role", if urgent { "alert" } else { "status" });
        setup.set_attr_default(host, "aria-live", if urgent { "assertive" } else { "polite" });
        setup.set_attr(host, "aria-atomic", "true");
        let close = setup.parts("close");
        for &button in &close {
            setup.set_attr_default(button, "aria-label", "Close");
        }
        Ok(Toast {
            close,
            countdown: RefCell::new(Countdown::default()),
            paused_by_hover: Cell::new(false),
        })
    }

    fn bind_events(widget: &Widget<Self>) {
        let host = widget.element();
        for &button in &widget.component().close {
            widget.on(button, "click", |w, _| w.dismiss());
        }
        widget.on(host, "mouseenter", |w, _| {
            if w.config().pause_on_hover && !w.is_paused() {
                w.pause();
                w.component().paused_by_hover.set(w.is_paused());
            }
        });
        widget.on(host, "mouseleave", |w, _| {
            if w.component().paused_by_hover.replace(false) {
                w.resume();
            }
        });
    }

    fn render(&self, view: &RenderView<'_, Self>) {
        let doc = view.document();
        let host = view.element();
        let ToastState { open, paused } = *view.state();
        view.set_open_state(host, open);
        doc.toggle_attr(host, "data-open", open);
        doc.toggle_attr(host, "data-paused", paused);
    }

    fn on_ready(widget: &Widget<Self>) {
        let duration = widget.config().duration_ms;
        widget.component().countdown.borrow_mut().remaining = duration;
        if duration > 0 {
            widget.start_countdown();
        }
    }

    fn teardown(&self, widget: &Widget<Self>) {
        if let Some(id) = self.countdown.borrow_mut().timer.take() {
            widget.clear_timeout(id);
        }
    }
}

impl Widget<Toast> {
    pub fn is_open(&self) -> bool {
        self.state().open
    }

    pub fn is_paused(&self) -> bool {
        self.state().paused
    }

    /// Countdown left, or `None` for a persistent toast.
    pub fn remaining_ms(&self) -> Option<u64> {
        if self.config().duration_ms == 0 {
            return None;
        }
        let countdown = self.component().countdown.borrow();
        let remaining = match countdown.timer {
            Some(_) => {
                let elapsed = self.document().now().saturating_sub(countdown.started_at);
                countdown.remaining.saturating_sub(elapsed)
            }
            None => countdown.remaining,
        };
        Some(remaining)
    }

    /// Stop the countdown, keeping what is left of it.
    pub fn pause(&self) {
        if !self.is_open() || self.is_paused() {
            return;
        }
        let remaining = self.remaining_ms();
        {
            let mut countdown = self.component().countdown.borrow_mut();
            if let Some(id) = countdown.timer.take() {
                self.clear_timeout(id);
            }
            if let Some(remaining) = remaining {
                countdown.remaining = remaining;
            }
        }
        self.set_state(ToastStatePatch::default().paused(true));
        self.dispatch(EventName::Pause, json!({ "remainingMs": remaining }));
    }

    /// Restart the countdown from where `pause` left it.
    pub fn resume(&self) {
        if !self.is_open() || !self.is_paused() {
            return;
        }
        self.component().paused_by_hover.set(false);
        self.set_state(ToastStatePatch::default().paused(false));
        if self.config().duration_ms > 0 {
            self.start_countdown();
        }
        self.dispatch(EventName::Resume, json!({ "remainingMs": self.remaining_ms() }));
    }

    /// Close now; the node is removed after `remove_delay_ms`.
    pub fn dismiss(&self) {
        if !self.is_open() || self.is_destroyed() {
            return;
        }
        if let Some(id) = self.component().countdown.borrow_mut().timer.take() {
            self.clear_timeout(id);
        }
        self.set_state(ToastStatePatch::default().open(false).paused(false));
        self.emit(LifecycleHook::Close, EventName::Close, Value::Null);
        self.set_timeout(self.config().remove_delay_ms, |w| {
            let host = w.element();
            w.destroy();
            w.document().remove_node(host);
        });
    }

    fn start_countdown(&self) {
        let now = self.document().now();
        let remaining = self.component().countdown.borrow().remaining;
        let id = self.set_timeout(remaining, |w| {
            w.component().countdown.borrow_mut().timer = None;
            w.dismiss();
        });
        let mut countdown = self.component().countdown.borrow_mut();
        countdown.timer = Some(id);
        countdown.started_at = now;
    }
}

/// Create a toast under `parent` showing `message`. The toast owns its node.
pub fn spawn(
    doc: &Document,
    parent: NodeId,
    message: &str,
    overrides: ToastConfigPatch,
) -> Result<Widget<Toast>, Error> {
    let kind = WidgetKind::Toast;
    let node = ElementBuilder::new("div")
        .attr(kind.marker_attribute(), "")
        .child(ElementBuilder::new("div").text(message))
        .child(
            ElementBuilder::new("button")
                .attr("type", "button")
                .attr(kind.part_attribute("close"), ""),
        )
        .append_to(doc, parent);
    create_toast(doc, node, overrides).inspect_err(|_| {
        doc.remove_node(node);
    })
}

pub fn create_toast(doc: &Document, element: NodeId, overrides: ToastConfigPatch) -> Result<Widget<Toast>, Error> {
    Widget::create(doc, element, overrides)
}

pub fn create_toast_with_hooks(
    doc: &Document,
    element: NodeId,
    overrides: ToastConfigPatch,
    hooks: Hooks<ToastState>,
) -> Result<Widget<Toast>, Error> {
    Widget::create_with_hooks(doc, element, overrides, hooks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Pilot;
    use std::rc::Rc;

    fn three_seconds() -> ToastConfigPatch {
        ToastConfigPatch::default().duration_ms(3000)
    }

    #[test]
    fn spawn_sets_role_and_counts_down() {
        let doc = Document::new();
        let t = spawn(&doc, doc.body(), "Saved", three_seconds()).unwrap();
        let host = t.element();
        assert_eq!(doc.attr(host, "role").as_deref(), Some("status"));
        assert_eq!(doc.attr(host, "aria-live").as_deref(), Some("polite"));
        assert_eq!(t.remaining_ms(), Some(3000));

        doc.advance_timers(2999);
        assert!(t.is_open());
        assert_eq!(t.remaining_ms(), Some(1));
        doc.advance_timers(1);
        assert!(!t.is_open());
        assert_eq!(doc.attr(host, "data-state").as_deref(), Some("closed"));
        assert!(doc.contains(host));

        doc.advance_timers(200);
        assert!(!doc.contains(host));
        assert!(t.is_destroyed());
        assert_eq!(doc.instance_count(), 0);
    }

    #[test]
    fn urgent_toast_is_an_alert() {
        let doc = Document::new();
        let t = spawn(&doc, doc.body(), "Failed", ToastConfigPatch::default().urgent(true)).unwrap();
        assert_eq!(doc.attr(t.element(), "role").as_deref(), Some("alert"));
    }

    #[test]
    fn pause_keeps_remainder() {
        let doc = Document::new();
        let t = spawn(&doc, doc.body(), "Hi", three_seconds()).unwrap();
        doc.advance_timers(1000);
        t.pause();
        assert!(t.is_paused());
        assert_eq!(t.remaining_ms(), Some(2000));
        doc.advance_timers(10_000);
        assert_eq!(t.remaining_ms(), Some(2000));
        t.resume();
        doc.advance_timers(1999);
        assert!(t.is_open());
        doc.advance_timers(1);
        assert!(!t.is_open());
    }

    #[test]
    fn hover_pauses_and_leave_resumes() {
        let doc = Document::new();
        let t = spawn(&doc, doc.body(), "Hi", three_seconds()).unwrap();
        let pilot = Pilot::new(&doc);
        pilot.hover(t.element());
        assert!(t.is_paused());
        pilot.advance(5000);
        assert!(t.is_open());
        pilot.unhover(t.element());
        assert!(!t.is_paused());
        pilot.advance(3000);
        assert!(!t.is_open());
    }

    #[test]
    fn leave_does_not_resume_a_manual_pause() {
        let doc = Document::new();
        let t = spawn(&doc, doc.body(), "Hi", three_seconds()).unwrap();
        let pilot = Pilot::new(&doc);
        t.pause();
        pilot.hover(t.element());
        pilot.unhover(t.element());
        assert!(t.is_paused());
    }

    #[test]
    fn persistent_toast_waits_for_close_button() {
        let doc = Document::new();
        let closed = Rc::new(Cell::new(false));
        let c = closed.clone();
        let node = ElementBuilder::new("div")
            .attr("data-coral-toast", "")
            .attr("data-duration", "0")
            .child(ElementBuilder::new("button").attr("data-coral-toast-close", ""))
            .append_to(&doc, doc.body());
        let hooks = Hooks::new().on_close(move || c.set(true));
        let t = create_toast_with_hooks(&doc, node, Default::default(), hooks).unwrap();
        assert_eq!(t.remaining_ms(), None);
        doc.advance_timers(60_000);
        assert!(t.is_open());

        let close = doc.query_selector_within(node, "[data-coral-toast-close]").unwrap().unwrap();
        Pilot::new(&doc).click(close);
        assert!(closed.get());
        doc.advance_timers(200);
        assert!(!doc.contains(node));
    }

    #[test]
    fn destroy_cancels_countdown() {
        let doc = Document::new();
        let t = spawn(&doc, doc.body(), "Hi", three_seconds()).unwrap();
        t.destroy();
        assert_eq!(doc.pending_timers(), 0);
        doc.advance_timers(5000);
        assert!(doc.contains(t.element()));
    }
}
