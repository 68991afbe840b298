//! `#[derive(Error)]` for error enums.
//!
//! ```ignore
//! use ls8_derive::Error;
//!
//! #[derive(Debug, Error)]
//! pub enum LoadError {
//!     #[error("program not found: {path}")]
//!     NotFound { path: String },
//!
//!     #[error("bad byte {0:#04x}")]
//!     BadByte(u8),
//!
//!     #[error("empty program")]
//!     Empty,
//! }
//! ```
//!
//! Tuple fields are referenced positionally (`{0}`, `{1:?}`), struct fields by
//! name (`{path}`, `{pc:#04x}`). Fields the message does not mention are not
//! bound, so a variant may carry context that only shows up in `Debug`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, Lit, Meta, Variant, parse_macro_input};

pub fn derive_error(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Error can only be derived for enums",
        ));
    };

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let arms = data
        .variants
        .iter()
        .map(display_arm)
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(quote! {
        impl #impl_generics ::std::fmt::Display for #name #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    #(#arms)*
                }
            }
        }

        impl #impl_generics ::std::error::Error for #name #ty_generics #where_clause {}
    })
}

/// Builds the `match` arm that formats one variant.
fn display_arm(variant: &Variant) -> syn::Result<TokenStream2> {
    let ident = &variant.ident;
    let message = error_message(variant)?;

    let arm = match &variant.fields {
        Fields::Unit => quote! {
            Self::#ident => f.write_str(#message),
        },
        Fields::Unnamed(fields) => {
            let mut format = message.clone();
            let mut patterns = Vec::with_capacity(fields.unnamed.len());
            let mut args = Vec::new();
            for i in 0..fields.unnamed.len() {
                let position = i.to_string();
                if mentions(&message, &position) {
                    let binding = format_ident!("f{}", i);
                    format = rename_placeholder(&format, &position, &binding.to_string());
                    args.push(quote! { #binding = #binding });
                    patterns.push(quote! { #binding });
                } else {
                    patterns.push(quote! { _ });
                }
            }
            quote! {
                Self::#ident(#(#patterns),*) => write!(f, #format #(, #args)*),
            }
        }
        Fields::Named(fields) => {
            let used: Vec<_> = fields
                .named
                .iter()
                .filter_map(|field| field.ident.as_ref())
                .filter(|field| mentions(&message, &field.to_string()))
                .collect();
            quote! {
                Self::#ident { #(#used,)* .. } => write!(f, #message #(, #used = #used)*),
            }
        }
    };

    Ok(arm)
}

/// Returns true when `message` contains a `{name}` or `{name:...}` placeholder.
fn mentions(message: &str, name: &str) -> bool {
    message.contains(&format!("{{{name}}}")) || message.contains(&format!("{{{name}:"))
}

fn rename_placeholder(message: &str, from: &str, to: &str) -> String {
    message
        .replace(&format!("{{{from}}}"), &format!("{{{to}}}"))
        .replace(&format!("{{{from}:"), &format!("{{{to}:"))
}

/// Reads the string literal out of the variant's `#[error("...")]` attribute.
fn error_message(variant: &Variant) -> syn::Result<String> {
    let attr = variant
        .attrs
        .iter()
        .find(|attr| attr.path().is_ident("error"))
        .ok_or_else(|| {
            syn::Error::new_spanned(
                &variant.ident,
                format!(
                    "variant `{}` is missing an #[error(\"...\")] message",
                    variant.ident
                ),
            )
        })?;

    let Meta::List(list) = &attr.meta else {
        return Err(syn::Error::new_spanned(
            &attr.meta,
            "expected #[error(\"message\")]",
        ));
    };

    match syn::parse2::<Lit>(list.tokens.clone()) {
        Ok(Lit::Str(lit)) => Ok(lit.value()),
        _ => Err(syn::Error::new_spanned(
            &attr.meta,
            "#[error] takes a single string literal, e.g. #[error(\"unknown opcode {opcode}\")]",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mentions_plain_and_formatted_placeholders() {
        assert!(mentions("at {pc}", "pc"));
        assert!(mentions("opcode {opcode:#010b}", "opcode"));
        assert!(!mentions("opcode {opcode_name}", "opcode"));
        assert!(!mentions("no fields", "pc"));
    }

    #[test]
    fn rename_placeholder_keeps_format_spec() {
        assert_eq!(
            rename_placeholder("{0} and {0:?}", "0", "f0"),
            "{f0} and {f0:?}"
        );
    }
}
