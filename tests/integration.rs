//! Integration tests for coral-runtime.
//!
//! These tests exercise the public API from outside the crate: markup built with
//! `html!`, widgets created through factories and auto-init, and user input
//! driven through the `Pilot`.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use coral_runtime::dom::NodeId;
use coral_runtime::event::{handler, EventTarget, Key, ListenerOptions};
use coral_runtime::runtime::create_component_factory;
use coral_runtime::testing::{outer_html, Pilot};
use coral_runtime::widgets::accordion::{create_accordion, AccordionConfigPatch};
use coral_runtime::widgets::dialog::create_dialog;
use coral_runtime::widgets::dropdown::create_dropdown;
use coral_runtime::widgets::range_slider::{create_range_slider, RangeSliderConfigPatch};
use coral_runtime::widgets::switch::create_switch;
use coral_runtime::widgets::toast::{self, ToastConfigPatch};
use coral_runtime::widgets::*;
use coral_runtime::{html, init_components, Document, Error};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn accordion_markup(doc: &Document) -> NodeId {
    html! {
        <div data-coral-accordion>
            <div data-coral-accordion-item>
                <button data-coral-accordion-trigger>"One"</button>
                <div data-coral-accordion-panel>"First"</div>
            </div>
            <div data-coral-accordion-item>
                <button data-coral-accordion-trigger>"Two"</button>
                <div data-coral-accordion-panel>"Second"</div>
            </div>
            <div data-coral-accordion-item>
                <button data-coral-accordion-trigger>"Three"</button>
                <div data-coral-accordion-panel>"Third"</div>
            </div>
        </div>
    }
    .append_to(doc, doc.body())
}

fn dialog_markup(doc: &Document) -> NodeId {
    html! {
        <div data-coral-dialog>
            <button data-coral-dialog-trigger>"Open"</button>
            <div data-coral-dialog-content>
                <h2 data-coral-dialog-title>"Settings"</h2>
                <button data-coral-dialog-close>"Done"</button>
            </div>
        </div>
    }
    .append_to(doc, doc.body())
}

fn dropdown_markup(doc: &Document) -> NodeId {
    html! {
        <div data-coral-dropdown>
            <button data-coral-dropdown-trigger>"Actions"</button>
            <div data-coral-dropdown-content>
                <div data-coral-dropdown-item data-value="copy">"Copy"</div>
                <div data-coral-dropdown-item data-value="paste">"Paste"</div>
            </div>
        </div>
    }
    .append_to(doc, doc.body())
}

fn range_markup(doc: &Document) -> NodeId {
    html! {
        <div data-coral-range-slider data-min="0" data-max="100" data-min-range="10">
            <div data-coral-range-slider-track>
                <div data-coral-range-slider-range></div>
                <div data-coral-range-slider-thumb-min></div>
                <div data-coral-range-slider-thumb-max></div>
            </div>
        </div>
    }
    .append_to(doc, doc.body())
}

/// One of every built-in widget.
fn full_page(doc: &Document) {
    accordion_markup(doc);
    dialog_markup(doc);
    dropdown_markup(doc);
    range_markup(doc);
    html! {
        <aside data-coral-drawer data-side="left">
            <nav data-coral-drawer-content></nav>
        </aside>
    }
    .append_to(doc, doc.body());
    html! { <button data-coral-switch></button> }.append_to(doc, doc.body());
    html! {
        <div data-coral-toast data-duration="0">
            <button data-coral-toast-close>"Dismiss"</button>
        </div>
    }
    .append_to(doc, doc.body());
}

// ---------------------------------------------------------------------------
// Render idempotence and teardown
// ---------------------------------------------------------------------------

#[test]
fn render_after_construction_mutates_nothing() {
    let doc = Document::new();
    let accordion = create_accordion(&doc, accordion_markup(&doc), Default::default()).unwrap();
    let dialog = create_dialog(&doc, dialog_markup(&doc), Default::default()).unwrap();
    let dropdown = create_dropdown(&doc, dropdown_markup(&doc), Default::default()).unwrap();
    let range = create_range_slider(&doc, range_markup(&doc), Default::default()).unwrap();
    let switch_node = html! { <button data-coral-switch></button> }.append_to(&doc, doc.body());
    let switch = create_switch(&doc, switch_node, Default::default()).unwrap();
    let toast = toast::spawn(&doc, doc.body(), "Saved", Default::default()).unwrap();

    let before = doc.mutation_count();
    accordion.render();
    dialog.render();
    dropdown.render();
    range.render();
    switch.render();
    toast.render();
    assert_eq!(doc.mutation_count(), before);

    accordion.open_panel(2);
    dialog.open();
    let before = doc.mutation_count();
    accordion.render();
    dialog.render();
    assert_eq!(doc.mutation_count(), before);
}

#[test]
fn destroyed_widgets_ignore_input() {
    let doc = Document::new();
    let switch_node = html! { <button data-coral-switch></button> }.append_to(&doc, doc.body());
    let switch = create_switch(&doc, switch_node, Default::default()).unwrap();
    let dialog = create_dialog(&doc, dialog_markup(&doc), Default::default()).unwrap();
    let accordion = create_accordion(&doc, accordion_markup(&doc), Default::default()).unwrap();
    let pilot = Pilot::new(&doc);

    dialog.open();
    switch.destroy();
    dialog.destroy();
    accordion.destroy();
    assert_eq!(doc.total_listeners(), 0);
    assert!(!doc.is_scroll_locked());

    pilot.click(switch_node);
    assert!(!switch.is_checked());
    assert_eq!(doc.attr(switch_node, "aria-checked").as_deref(), Some("false"));

    pilot.click(accordion.trigger(0).unwrap());
    assert!(!accordion.is_panel_open(0));

    // Destroy is idempotent.
    switch.destroy();
    assert_eq!(doc.instance_count(), 0);
}

// ---------------------------------------------------------------------------
// Exclusive and multiple open
// ---------------------------------------------------------------------------

#[test]
fn accordion_single_mode_end_to_end() {
    let doc = Document::new();
    let root = accordion_markup(&doc);
    let accordion = create_accordion(
        &doc,
        root,
        AccordionConfigPatch::default().multiple(false).default_open(vec![]),
    )
    .unwrap();

    accordion.open_panel(1);
    assert!(accordion.is_panel_open(1));
    assert!(!accordion.is_panel_open(0));
    assert!(!accordion.is_panel_open(2));

    let trigger = accordion.trigger(1).unwrap();
    let panel = accordion.panel(1).unwrap();
    assert_eq!(doc.attr(trigger, "aria-expanded").as_deref(), Some("true"));
    assert!(doc.has_attr(trigger, "data-open"));
    assert!(!doc.has_attr(panel, "hidden"));
    assert!(doc.has_attr(accordion.panel(0).unwrap(), "hidden"));

    accordion.open_panel(2);
    assert_eq!(accordion.open_panels(), vec![2]);
}

#[test]
fn accordion_multiple_mode_keeps_others_open() {
    let doc = Document::new();
    let root = accordion_markup(&doc);
    let accordion = create_accordion(&doc, root, AccordionConfigPatch::default().multiple(true)).unwrap();
    let pilot = Pilot::new(&doc);
    pilot.click(accordion.trigger(0).unwrap());
    pilot.click(accordion.trigger(2).unwrap());
    assert_eq!(accordion.open_panels(), vec![0, 2]);
}

#[test]
fn opening_one_dropdown_closes_the_other() {
    let doc = Document::new();
    let first = create_dropdown(&doc, dropdown_markup(&doc), Default::default()).unwrap();
    let second = create_dropdown(&doc, dropdown_markup(&doc), Default::default()).unwrap();
    let pilot = Pilot::new(&doc);

    pilot.click(first.trigger());
    assert!(first.is_open());
    pilot.click(second.trigger());
    assert!(!first.is_open());
    assert!(second.is_open());
    assert_eq!(doc.layer_count(), 1);
}

// ---------------------------------------------------------------------------
// Shared resources
// ---------------------------------------------------------------------------

#[test]
fn scroll_lock_is_reference_counted_across_stacked_modals() {
    let doc = Document::new();
    let first = create_dialog(&doc, dialog_markup(&doc), Default::default()).unwrap();
    let second = create_dialog(&doc, dialog_markup(&doc), Default::default()).unwrap();

    first.open();
    second.open();
    assert_eq!(doc.style(doc.body(), "overflow").as_deref(), Some("hidden"));

    first.close();
    assert!(doc.is_scroll_locked());
    assert_eq!(doc.style(doc.body(), "overflow").as_deref(), Some("hidden"));
    // The inner dialog keeps focus.
    let active = doc.active_element().unwrap();
    assert!(doc.is_within(second.content(), active));

    second.close();
    assert!(!doc.is_scroll_locked());
    assert_eq!(doc.style(doc.body(), "overflow"), None);
}

#[test]
fn tab_stays_inside_an_open_dialog() {
    let doc = Document::new();
    let outside = html! { <button>"Elsewhere"</button> }.append_to(&doc, doc.body());
    let dialog = create_dialog(&doc, dialog_markup(&doc), Default::default()).unwrap();
    let pilot = Pilot::new(&doc);
    doc.focus(outside);

    dialog.open();
    let close = doc
        .query_selector_within(dialog.content(), "[data-coral-dialog-close]")
        .unwrap()
        .unwrap();
    assert_eq!(doc.active_element(), Some(close));
    pilot.tab();
    assert_eq!(doc.active_element(), Some(close));
    pilot.shift_tab();
    assert_eq!(doc.active_element(), Some(close));

    pilot.press_key(Key::Escape);
    assert!(!dialog.is_open());
    assert_eq!(doc.active_element(), Some(outside));
}

// ---------------------------------------------------------------------------
// Timers
// ---------------------------------------------------------------------------

#[test]
fn toast_pause_resumes_from_remainder() {
    let doc = Document::new();
    let toast = toast::spawn(&doc, doc.body(), "Uploaded", ToastConfigPatch::default().duration_ms(3000)).unwrap();

    doc.advance_timers(1500);
    toast.pause();
    doc.advance_timers(3000);
    assert!(toast.is_open());
    assert_eq!(toast.remaining_ms(), Some(1500));

    toast.resume();
    doc.advance_timers(1500);
    assert!(!toast.is_open());
}

#[tokio::test(start_paused = true)]
async fn drive_timers_runs_the_toast_lifecycle() {
    let doc = Document::new();
    let toast = toast::spawn(&doc, doc.body(), "Synced", ToastConfigPatch::default().duration_ms(3000)).unwrap();
    let node = toast.element();
    let start = tokio::time::Instant::now();

    doc.drive_timers().await;

    assert!(start.elapsed() >= Duration::from_millis(3200));
    assert_eq!(doc.now(), 3200);
    assert!(toast.is_destroyed());
    assert!(!doc.contains(node));
}

// ---------------------------------------------------------------------------
// Widget contracts
// ---------------------------------------------------------------------------

#[test]
fn switch_set_checked_twice_dispatches_once() {
    let doc = Document::new();
    let node = html! { <button data-coral-switch></button> }.append_to(&doc, doc.body());
    let changes = Rc::new(Cell::new(0));
    let c = changes.clone();
    doc.add_event_listener(
        EventTarget::Document,
        "coral:switch:change",
        handler(move |_| c.set(c.get() + 1)),
        ListenerOptions::default(),
    );
    let switch = create_switch(&doc, node, Default::default()).unwrap();
    switch.set_checked(true);
    switch.set_checked(true);
    assert_eq!(changes.get(), 1);
}

#[test]
fn switch_markup_snapshot() {
    let doc = Document::new();
    let node = html! {
        <button data-coral-switch>
            <span data-coral-switch-thumb></span>
        </button>
    }
    .append_to(&doc, doc.body());
    let switch = create_switch(&doc, node, Default::default()).unwrap();
    insta::assert_snapshot!(outer_html(&doc, node), @r#"
    <button data-coral-switch id="switch-1" role="switch" tabindex="0" aria-checked="false" data-state="unchecked">
      <span data-coral-switch-thumb data-state="unchecked"></span>
    </button>
    "#);

    switch.toggle();
    insta::assert_snapshot!(outer_html(&doc, node), @r#"
    <button data-coral-switch id="switch-1" role="switch" tabindex="0" aria-checked="true" data-state="checked" data-checked>
      <span data-coral-switch-thumb data-state="checked"></span>
    </button>
    "#);
}

#[test]
fn range_slider_min_value_clamps_to_min_range() {
    let doc = Document::new();
    let slider = create_range_slider(&doc, range_markup(&doc), Default::default()).unwrap();
    slider.set_min_value(95.0);
    assert_eq!(slider.values(), (90.0, 100.0));

    let other = create_range_slider(
        &doc,
        range_markup(&doc),
        RangeSliderConfigPatch::default().min_range(0.0),
    )
    .unwrap();
    other.set_min_value(95.0);
    assert_eq!(other.values(), (95.0, 100.0));
}

// ---------------------------------------------------------------------------
// Factories and auto-init
// ---------------------------------------------------------------------------

#[test]
fn factory_names_the_missing_selector() {
    let doc = Document::new();
    let factory = create_component_factory::<Switch>();
    let err = factory.create(&doc, "#missing-switch", Default::default()).unwrap_err();
    assert!(matches!(&err, Error::ElementNotFound { selector } if selector == "#missing-switch"));
    assert_eq!(err.to_string(), "no element matches selector `#missing-switch`");

    let node = html! { <button id="wifi" data-coral-switch></button> }.append_to(&doc, doc.body());
    let switch = factory.create(&doc, "#wifi", Default::default()).unwrap();
    assert_eq!(switch.element(), node);
}

#[test]
fn init_components_finds_every_widget_once() {
    let doc = Document::new();
    full_page(&doc);

    let widgets = init_components(&doc);
    let mut kinds: Vec<&str> = widgets.iter().map(|w| w.kind().as_str()).collect();
    kinds.sort_unstable();
    assert_eq!(
        kinds,
        vec!["accordion", "dialog", "drawer", "dropdown", "range-slider", "switch", "toast"]
    );
    assert_eq!(doc.instance_count(), 7);
    assert!(init_components(&doc).is_empty());

    let switch_node = doc.query_selector("[data-coral-switch]").unwrap().unwrap();
    let switch = doc.instance::<Switch>(switch_node).unwrap();
    Pilot::new(&doc).click(switch_node);
    assert!(switch.is_checked());

    let drawer_node = doc.query_selector("[data-coral-drawer]").unwrap().unwrap();
    let drawer = doc.instance::<Drawer>(drawer_node).unwrap();
    assert_eq!(drawer.side().as_str(), "left");

    assert_eq!(doc.destroy_all(), 7);
    assert_eq!(doc.instance_count(), 0);
    assert_eq!(doc.total_listeners(), 0);
    assert!(widgets.iter().all(|w| w.is_destroyed()));
}
