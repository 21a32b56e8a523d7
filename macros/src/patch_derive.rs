//! `#[derive(Patch)]`: generate an all-`Option` partial type plus merge logic.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Error, Fields, Result};

pub(crate) fn patch_impl(input: TokenStream) -> Result<TokenStream> {
    let input: DeriveInput = syn::parse2(input)?;

    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "Patch cannot be derived for generic types",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            other => {
                return Err(Error::new_spanned(
                    other,
                    "Patch requires a struct with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new_spanned(
                &input.ident,
                "Patch can only be derived for structs",
            ))
        }
    };

    let vis = &input.vis;
    let name = &input.ident;
    let patch_name = format_ident!("{}Patch", name);
    let doc = format!("Partial update for [`{name}`]. `None` fields are left untouched.");

    let idents: Vec<_> = fields.iter().filter_map(|f| f.ident.as_ref()).collect();
    let types: Vec<_> = fields.iter().map(|f| &f.ty).collect();

    let setters = idents.iter().zip(types.iter()).map(|(ident, ty)| {
        let setter_doc = format!("Set `{ident}`.");
        quote! {
            #[doc = #setter_doc]
            pub fn #ident(mut self, value: #ty) -> Self {
                self.#ident = ::core::option::Option::Some(value);
                self
            }
        }
    });

    Ok(quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, Default)]
        #vis struct #patch_name {
            #( pub #idents: ::core::option::Option<#types>, )*
        }

        impl #patch_name {
            #( #setters )*

            /// Whether no field is set.
            pub fn is_empty(&self) -> bool {
                true #( && self.#idents.is_none() )*
            }
        }

        impl ::coral_runtime::Patch for #name {
            type Patch = #patch_name;

            fn apply(&mut self, patch: Self::Patch) {
                #(
                    if let ::core::option::Option::Some(value) = patch.#idents {
                        self.#idents = value;
                    }
                )*
            }

            fn overlay(primary: Self::Patch, fallback: Self::Patch) -> Self::Patch {
                #patch_name {
                    #( #idents: primary.#idents.or(fallback.#idents), )*
                }
            }
        }
    })
}
