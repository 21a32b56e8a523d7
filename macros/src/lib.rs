//! Proc macros for coral-runtime: `#[derive(Patch)]` partial updates and `html!`
//! DOM fixtures.
//!
//! This crate is not meant to be used directly; `coral-runtime` re-exports both macros.

use proc_macro::TokenStream;

mod html_macro;
mod patch_derive;

/// Derive a partial-update type for a configuration or state struct.
///
/// For a struct `Foo` with named fields, generates `FooPatch` where every field is
/// wrapped in `Option` (`None` means "not passed"), one builder setter per field,
/// and an implementation of `coral_runtime::Patch` for `Foo`.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug, Clone, Patch)]
/// pub struct SwitchConfig {
///     pub default_checked: bool,
///     pub disabled: bool,
/// }
///
/// let overrides = SwitchConfigPatch::default().default_checked(true);
/// ```
#[proc_macro_derive(Patch)]
pub fn derive_patch(input: TokenStream) -> TokenStream {
    patch_derive::patch_impl(input.into())
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

/// JSX-like DOM fixture macro.
///
/// Expands to a `coral_runtime::dom::ElementBuilder` tree.
///
/// # Syntax
///
/// - `<tag />` or `<tag> ... </tag>`
/// - `name="value"`, `name={expr}`, or a bare boolean attribute `name`
/// - attribute names may contain dashes: `data-coral-accordion-trigger`, `aria-label`
/// - children are elements, string literals (text), or `{iter}` yielding builders
///
/// # Example
///
/// ```ignore
/// let root = html! {
///     <div data-coral-switch aria-checked="true">
///         <span>"Wi-Fi"</span>
///     </div>
/// }
/// .build(&doc);
/// ```
#[proc_macro]
pub fn html(input: TokenStream) -> TokenStream {
    html_macro::html_impl(input.into())
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
