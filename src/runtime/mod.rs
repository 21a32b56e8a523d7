//! Component runtime: the base every widget is built on.
//!
//! - [`component`]: the `Component` trait, `Setup` and `RenderView`
//! - [`widget`]: `Widget<C>` lifecycle, dispatch and tracked listeners
//! - [`store`]: snapshot state store and the `Patch` trait
//! - [`config`]: `explicit ?? markup ?? default` resolution and warnings
//! - [`hooks`]: caller callbacks
//! - [`tracked`]: per-widget listener registry
//! - [`attrs`], [`context`]: attribute parsing, ids, parts
//! - [`focus_trap`], [`scroll_lock`]: shared modal resources
//! - [`factory`]: factories, auto-init, registry

pub mod attrs;
pub mod component;
pub mod config;
pub mod context;
pub mod factory;
pub mod focus_trap;
pub mod hooks;
pub mod scroll_lock;
pub mod store;
pub mod tracked;
pub mod widget;

pub use component::{Component, RenderView, Setup};
pub use config::{resolve_config, resolve_field, ConfigPatch, ConfigWarning};
pub use factory::{auto_init, create_component_factory, resolve_element, ComponentFactory, ElementRef, Registry};
pub use hooks::{Hooks, InterceptHook, LifecycleHook};
pub use scroll_lock::ScrollLockGuard;
pub use store::{Patch, StateStore, Subscription};
pub use widget::{AnyWidget, WeakWidget, Widget};
