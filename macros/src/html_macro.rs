//! html! macro: parse JSX-like markup and generate `ElementBuilder` chains.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::{token, Error, Expr, Ident, LitStr, Result, Token};

// ---------------------------------------------------------------------------
// AST types
// ---------------------------------------------------------------------------

/// Attribute value: a literal, a braced expression, or absent (boolean attribute).
pub(crate) enum AttrValue {
    Lit(LitStr),
    Expr(Expr),
    Flag,
}

/// A parsed attribute. The name keeps its dashes: `data-coral-switch`.
pub(crate) struct Attribute {
    pub name: String,
    pub span: Span,
    pub value: AttrValue,
}

/// A child node inside an element body.
pub(crate) enum Child {
    Element(Element),
    Text(LitStr),
    Splice(Expr),
}

/// A parsed element: `<tag attrs... />` or `<tag attrs...> children </tag>`.
pub(crate) struct Element {
    pub tag: Ident,
    pub attrs: Vec<Attribute>,
    pub children: Vec<Child>,
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.tag.to_string())
            .field(
                "attrs",
                &self.attrs.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(),
            )
            .field("children", &self.children.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

impl Parse for Element {
    fn parse(input: ParseStream) -> Result<Self> {
        parse_element(input)
    }
}

/// Parse a dash-joined attribute name. Keywords (`type`, `for`) are accepted.
fn parse_attr_name(input: ParseStream) -> Result<(String, Span)> {
    let first = Ident::parse_any(input)?;
    let span = first.span();
    let mut name = first.to_string();
    while input.peek(Token![-]) {
        input.parse::<Token![-]>()?;
        let part = Ident::parse_any(input)?;
        name.push('-');
        name.push_str(&part.to_string());
    }
    Ok((name, span))
}

pub(crate) fn parse_element(input: ParseStream) -> Result<Element> {
    input.parse::<Token![<]>()?;
    let tag = Ident::parse_any(input)?;

    let mut attrs = Vec::new();
    loop {
        if input.peek(Token![/]) {
            input.parse::<Token![/]>()?;
            input.parse::<Token![>]>()?;
            return Ok(Element {
                tag,
                attrs,
                children: Vec::new(),
            });
        }

        if input.peek(Token![>]) {
            input.parse::<Token![>]>()?;
            break;
        }

        let (name, span) = parse_attr_name(input)?;
        let value = if input.peek(Token![=]) {
            input.parse::<Token![=]>()?;
            if input.peek(token::Brace) {
                let content;
                syn::braced!(content in input);
                AttrValue::Expr(content.parse()?)
            } else {
                AttrValue::Lit(input.parse()?)
            }
        } else {
            AttrValue::Flag
        };
        attrs.push(Attribute { name, span, value });
    }

    let mut children = Vec::new();
    loop {
        if input.peek(Token![<]) && input.peek2(Token![/]) {
            input.parse::<Token![<]>()?;
            input.parse::<Token![/]>()?;
            let closing = Ident::parse_any(input)?;
            if closing != tag {
                return Err(Error::new(
                    closing.span(),
                    format!(
                        "mismatched closing tag: expected `</{}>`, found `</{}>`",
                        tag, closing
                    ),
                ));
            }
            input.parse::<Token![>]>()?;
            break;
        }

        if input.peek(Token![<]) {
            children.push(Child::Element(parse_element(input)?));
        } else if input.peek(LitStr) {
            children.push(Child::Text(input.parse()?));
        } else if input.peek(token::Brace) {
            let content;
            syn::braced!(content in input);
            children.push(Child::Splice(content.parse()?));
        } else if input.is_empty() {
            return Err(Error::new(
                tag.span(),
                format!("unclosed element: expected `</{}>`", tag),
            ));
        } else {
            return Err(input.error("expected a child element, a string literal, or `{...}`"));
        }
    }

    Ok(Element {
        tag,
        attrs,
        children,
    })
}

// ---------------------------------------------------------------------------
// Code generation
// ---------------------------------------------------------------------------

fn generate_element(elem: &Element) -> TokenStream {
    let tag = LitStr::new(&elem.tag.to_string(), elem.tag.span());

    let attr_calls = elem.attrs.iter().map(|attr| {
        let name = LitStr::new(&attr.name, attr.span);
        match &attr.value {
            AttrValue::Lit(lit) => quote! { .attr(#name, #lit) },
            AttrValue::Expr(expr) => quote! { .attr(#name, ::std::string::ToString::to_string(&(#expr))) },
            AttrValue::Flag => quote! { .attr(#name, "") },
        }
    });

    let child_calls = elem.children.iter().map(|child| match child {
        Child::Element(el) => {
            let inner = generate_element(el);
            quote! { .child(#inner) }
        }
        Child::Text(lit) => quote! { .text(#lit) },
        Child::Splice(expr) => quote! { .children(#expr) },
    });

    quote! {
        ::coral_runtime::dom::ElementBuilder::new(#tag)
            #( #attr_calls )*
            #( #child_calls )*
    }
}

pub(crate) fn html_impl(input: TokenStream) -> Result<TokenStream> {
    let root: Element = syn::parse2(input)?;
    Ok(generate_element(&root))
}
