//! Range slider: two thumbs selecting a sub-range of `[min, max]`.
//!
//! The thumbs never cross and always stay at least `min_range` apart. Dragging
//! binds move and release listeners on the document for the duration of the
//! gesture, so releasing the pointer anywhere ends it.

use serde_json::json;

use crate::document::Document;
use crate::dom::NodeId;
use crate::error::Error;
use crate::event::{Event, EventName, EventTarget, Key, WidgetKind};
use crate::runtime::attrs;
use crate::runtime::config::{ConfigPatch, ConfigWarning};
use crate::runtime::{Component, Hooks, RenderView, Setup, Widget};
use crate::Patch;

/// Keyboard Page keys move this many steps.
const PAGE_STEPS: f64 = 10.0;

/// Listener keys held while a drag is in progress.
const DRAG_KEYS: [&str; 4] = ["mousemove-drag", "touchmove-drag", "mouseup-drag", "touchend-drag"];

#[derive(Debug, Clone, PartialEq, Patch)]
pub struct RangeSliderConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    /// Smallest allowed distance between the two values.
    pub min_range: f64,
    /// Starting lower value; `None` starts at `min`.
    pub default_min_value: Option<f64>,
    /// Starting upper value; `None` starts at `max`.
    pub default_max_value: Option<f64>,
    pub disabled: bool,
}

/// One of the two thumbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Thumb {
    Min,
    Max,
}

#[derive(Debug, Clone, PartialEq, Patch)]
pub struct RangeSliderState {
    pub min_value: f64,
    pub max_value: f64,
    pub dragging: Option<Thumb>,
}

pub struct RangeSlider {
    track: Option<NodeId>,
    range: Option<NodeId>,
    thumb_min: NodeId,
    thumb_max: NodeId,
}

fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

/// Round `value` to the nearest multiple of `step` counted from `min`.
fn snap(value: f64, config: &RangeSliderConfig) -> f64 {
    let steps = ((value - config.min) / config.step).round();
    config.min + steps * config.step
}

fn percent(value: f64, config: &RangeSliderConfig) -> f64 {
    let span = config.max - config.min;
    if span <= 0.0 {
        return 0.0;
    }
    (value - config.min) / span * 100.0
}

impl Component for RangeSlider {
    type Config = RangeSliderConfig;
    type State = RangeSliderState;
    const KIND: WidgetKind = WidgetKind::RangeSlider;

    fn default_config() -> RangeSliderConfig {
        RangeSliderConfig {
            min: 0.0,
            max: 100.0,
            step: 1.0,
            min_range: 0.0,
            default_min_value: None,
            default_max_value: None,
            disabled: false,
        }
    }

    fn initial_state(config: &RangeSliderConfig) -> RangeSliderState {
        let hi = snap(config.default_max_value.unwrap_or(config.max), config);
        let max_value = clamp(hi, config.min + config.min_range, config.max);
        let lo = snap(config.default_min_value.unwrap_or(config.min), config);
        let min_value = clamp(lo, config.min, max_value - config.min_range);
        RangeSliderState {
            min_value,
            max_value,
            dragging: None,
        }
    }

    fn config_from_dom(doc: &Document, element: NodeId) -> ConfigPatch<Self> {
        let number = |name: &str| attrs::number_attr::<f64>(doc, element, name);
        RangeSliderConfigPatch {
            min: number("data-min"),
            max: number("data-max"),
            step: number("data-step"),
            min_range: number("data-min-range"),
            default_min_value: number("data-default-min-value").map(Some),
            default_max_value: number("data-default-max-value").map(Some),
            disabled: attrs::bool_attr(doc, element, "data-disabled"),
        }
    }

    fn validate_config(config: &mut RangeSliderConfig) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        if config.min > config.max {
            std::mem::swap(&mut config.min, &mut config.max);
            warnings.push(ConfigWarning::new("min", "`min` was greater than `max`; swapped"));
        }
        if config.step.is_nan() || config.step <= 0.0 {
            warnings.push(ConfigWarning::new(
                "step",
                format!("step must be positive, got {}; using 1", config.step),
            ));
            config.step = 1.0;
        }
        if config.min_range < 0.0 {
            warnings.push(ConfigWarning::new("min_range", "negative `min_range`; using 0"));
            config.min_range = 0.0;
        }
        let span = config.max - config.min;
        if config.min_range > span {
            warnings.push(ConfigWarning::new(
                "min_range",
                format!("`min_range` {} exceeds the span {span}; clamped", config.min_range),
            ));
            config.min_range = span;
        }
        warnings
    }

    fn setup_aria(setup: &mut Setup<'_, Self>) -> Result<Self, Error> {
        let thumb_min = setup.require_part("thumb-min")?;
        let thumb_max = setup.require_part("thumb-max")?;
        let track = setup.part("track");
        let range = setup.part("range");
        for (thumb, label) in [(thumb_min, "Minimum"), (thumb_max, "Maximum")] {
            setup.set_attr_default(thumb, "role", "slider");
            setup.set_attr_default(thumb, "aria-label", label);
            setup.set_attr(thumb, "aria-orientation", "horizontal");
        }
        Ok(RangeSlider {
            track,
            range,
            thumb_min,
            thumb_max,
        })
    }

    fn bind_events(widget: &Widget<Self>) {
        let RangeSlider {
            thumb_min, thumb_max, ..
        } = *widget.component();
        for (thumb, which) in [(thumb_min, Thumb::Min), (thumb_max, Thumb::Max)] {
            widget.on(thumb, "keydown", move |w, ev| w.handle_key(which, ev));
        }
        let host = widget.element();
        widget.on(host, "mousedown", |w, ev| w.start_drag(ev));
        widget.on(host, "touchstart", |w, ev| w.start_drag(ev));
    }

    fn render(&self, view: &RenderView<'_, Self>) {
        let doc = view.document();
        let config = view.config();
        let RangeSliderState {
            min_value,
            max_value,
            dragging,
        } = *view.state();
        let disabled = config.disabled;

        doc.toggle_attr(view.element(), "data-disabled", disabled);
        let bounds = [
            (self.thumb_min, Thumb::Min, config.min, max_value - config.min_range, min_value),
            (self.thumb_max, Thumb::Max, min_value + config.min_range, config.max, max_value),
        ];
        for (thumb, which, lo, hi, value) in bounds {
            doc.set_attr(thumb, "aria-valuemin", lo.to_string());
            doc.set_attr(thumb, "aria-valuemax", hi.to_string());
            doc.set_attr(thumb, "aria-valuenow", value.to_string());
            doc.set_attr(thumb, "tabindex", if disabled { "-1" } else { "0" });
            doc.toggle_attr(thumb, "data-disabled", disabled);
            doc.toggle_attr(thumb, "data-dragging", dragging == Some(which));
            doc.set_style(thumb, "left", format!("{}%", percent(value, config)));
        }
        if disabled {
            doc.set_attr(view.element(), "aria-disabled", "true");
        } else {
            doc.remove_attr(view.element(), "aria-disabled");
        }
        if let Some(range) = self.range {
            let start = percent(min_value, config);
            let end = percent(max_value, config);
            doc.set_style(range, "left", format!("{start}%"));
            doc.set_style(range, "width", format!("{}%", end - start));
        }
    }

    fn on_config_change(widget: &Widget<Self>) {
        widget.clamp_to_config();
    }

    fn teardown(&self, widget: &Widget<Self>) {
        for key in DRAG_KEYS {
            widget.unbind_keyed(key);
        }
    }
}

impl Widget<RangeSlider> {
    /// `(min_value, max_value)`.
    pub fn values(&self) -> (f64, f64) {
        let state = self.state();
        (state.min_value, state.max_value)
    }

    pub fn is_dragging(&self) -> bool {
        self.state().dragging.is_some()
    }

    /// Set the lower value, clamped to `[min, max_value - min_range]`.
    pub fn set_min_value(&self, value: f64) {
        let config = self.config();
        let (current, max_value) = self.values();
        let next = clamp(snap(value, &config), config.min, max_value - config.min_range);
        if next != current {
            self.set_state(RangeSliderStatePatch::default().min_value(next));
            self.dispatch_change();
        }
    }

    /// Set the upper value, clamped to `[min_value + min_range, max]`.
    pub fn set_max_value(&self, value: f64) {
        let config = self.config();
        let (min_value, current) = self.values();
        let next = clamp(snap(value, &config), min_value + config.min_range, config.max);
        if next != current {
            self.set_state(RangeSliderStatePatch::default().max_value(next));
            self.dispatch_change();
        }
    }

    /// Pull both values back inside the current bounds after a config change.
    fn clamp_to_config(&self) {
        let config = self.config();
        let (lo, hi) = self.values();
        let next_lo = clamp(snap(lo, &config), config.min, config.max - config.min_range);
        let next_hi = clamp(snap(hi, &config), next_lo + config.min_range, config.max);
        if (next_lo, next_hi) != (lo, hi) {
            self.set_state(RangeSliderStatePatch::default().min_value(next_lo).max_value(next_hi));
            self.dispatch_change();
        }
    }

    pub fn set_value(&self, thumb: Thumb, value: f64) {
        match thumb {
            Thumb::Min => self.set_min_value(value),
            Thumb::Max => self.set_max_value(value),
        }
    }

    pub fn value(&self, thumb: Thumb) -> f64 {
        let (lo, hi) = self.values();
        match thumb {
            Thumb::Min => lo,
            Thumb::Max => hi,
        }
    }

    pub fn thumb(&self, thumb: Thumb) -> NodeId {
        match thumb {
            Thumb::Min => self.component().thumb_min,
            Thumb::Max => self.component().thumb_max,
        }
    }

    /// The track, falling back to the host when there is none.
    pub fn track_node(&self) -> NodeId {
        self.component().track.unwrap_or(self.element())
    }

    fn dispatch_change(&self) {
        let (lo, hi) = self.values();
        self.dispatch(EventName::Change, json!({ "minValue": lo, "maxValue": hi }));
    }

    fn dispatch_commit(&self) {
        let (lo, hi) = self.values();
        self.dispatch(EventName::ValueCommit, json!({ "minValue": lo, "maxValue": hi }));
    }

    fn handle_key(&self, thumb: Thumb, ev: &Event) {
        let config = self.config();
        if config.disabled {
            return;
        }
        let current = self.value(thumb);
        let target = match ev.key() {
            Some(Key::ArrowRight | Key::ArrowUp) => current + config.step,
            Some(Key::ArrowLeft | Key::ArrowDown) => current - config.step,
            Some(Key::PageUp) => current + config.step * PAGE_STEPS,
            Some(Key::PageDown) => current - config.step * PAGE_STEPS,
            Some(Key::Home) => config.min,
            Some(Key::End) => config.max,
            _ => return,
        };
        ev.prevent_default();
        let before = self.values();
        self.set_value(thumb, target);
        if self.values() != before {
            self.dispatch_commit();
        }
    }

    /// Map a pointer x coordinate onto the value scale through the track's box.
    fn value_at(&self, x: f64) -> Option<f64> {
        let rect = self.document().rect(self.track_node());
        if rect.width <= 0.0 {
            return None;
        }
        let config = self.config();
        let ratio = clamp((x - rect.x) / rect.width, 0.0, 1.0);
        Some(config.min + ratio * (config.max - config.min))
    }

    fn start_drag(&self, ev: &Event) {
        if self.config().disabled || self.is_dragging() {
            return;
        }
        let Some(target) = ev.target_node() else {
            return;
        };
        let RangeSlider {
            thumb_min, thumb_max, ..
        } = *self.component();
        let doc = self.document();
        let pointer_value = ev.pointer_info().and_then(|p| self.value_at(p.x));
        let thumb = if doc.is_within(thumb_min, target) {
            Thumb::Min
        } else if doc.is_within(thumb_max, target) {
            Thumb::Max
        } else if let Some(value) = pointer_value {
            let (lo, hi) = self.values();
            let thumb = if (value - lo).abs() <= (value - hi).abs() { Thumb::Min } else { Thumb::Max };
            self.set_value(thumb, value);
            thumb
        } else {
            return;
        };
        ev.prevent_default();
        doc.focus(self.thumb(thumb));
        self.set_state(RangeSliderStatePatch::default().dragging(Some(thumb)));

        let on_move = move |w: &Widget<RangeSlider>, ev: &Event| {
            if let Some(value) = ev.pointer_info().and_then(|p| w.value_at(p.x)) {
                w.set_value(thumb, value);
            }
        };
        self.bind_keyed("mousemove-drag", EventTarget::Document, on_move);
        self.bind_keyed("touchmove-drag", EventTarget::Document, on_move);
        self.bind_keyed("mouseup-drag", EventTarget::Document, |w, _| w.end_drag());
        self.bind_keyed("touchend-drag", EventTarget::Document, |w, _| w.end_drag());
        tracing::trace!(widget = %WidgetKind::RangeSlider, ?thumb, "drag started");
    }

    fn end_drag(&self) {
        for key in DRAG_KEYS {
            self.unbind_keyed(key);
        }
        if self.is_dragging() {
            self.set_state(RangeSliderStatePatch::default().dragging(None));
            self.dispatch_commit();
        }
    }
}

pub fn create_range_slider(
    doc: &Document,
    element: NodeId,
    overrides: RangeSliderConfigPatch,
) -> Result<Widget<RangeSlider>, Error> {
    Widget::create(doc, element, overrides)
}

pub fn create_range_slider_with_hooks(
    doc: &Document,
    element: NodeId,
    overrides: RangeSliderConfigPatch,
    hooks: Hooks<RangeSliderState>,
) -> Result<Widget<RangeSlider>, Error> {
    Widget::create_with_hooks(doc, element, overrides, hooks)
}
