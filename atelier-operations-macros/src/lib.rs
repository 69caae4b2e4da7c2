//! Procedural macros for defining operations
//!
//! This crate provides the `#[operation]` attribute macro, which implements
//! `atelier_operations::Operation` for the struct it annotates.

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input, Data, DeriveInput, Ident, Lit, LitStr, Token,
};

/// Attribute macro for defining an operation
///
/// # Usage
///
/// ```ignore
/// #[operation(verb = "move", noun = "lane", description = "Reorder a lane")]
/// #[derive(Debug, Deserialize)]
/// pub struct MoveLane {
///     /// Current position of the lane
///     pub from: usize,
///     /// Position to move it to
///     pub to: usize,
/// }
/// ```
#[proc_macro_attribute]
pub fn operation(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as OperationArgs);
    let input = parse_macro_input!(item as DeriveInput);

    if !matches!(input.data, Data::Struct(_)) {
        return syn::Error::new_spanned(&input.ident, "operation macro only supports structs")
            .to_compile_error()
            .into();
    }

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let OperationArgs {
        verb,
        noun,
        description,
    } = &args;

    let expanded = quote! {
        #input

        impl #impl_generics atelier_operations::Operation for #name #ty_generics #where_clause {
            fn verb(&self) -> &'static str {
                #verb
            }

            fn noun(&self) -> &'static str {
                #noun
            }

            fn description(&self) -> &'static str {
                #description
            }
        }
    };

    TokenStream::from(expanded)
}

/// Arguments for the #[operation(...)] attribute
struct OperationArgs {
    verb: LitStr,
    noun: LitStr,
    description: LitStr,
}

impl Parse for OperationArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut verb = None;
        let mut noun = None;
        let mut description = None;

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            let value: Lit = input.parse()?;

            let value = match value {
                Lit::Str(s) => s,
                _ => return Err(syn::Error::new_spanned(value, "expected string literal")),
            };
            if value.value().trim().is_empty() {
                return Err(syn::Error::new_spanned(
                    &value,
                    format!("'{}' must not be empty", ident),
                ));
            }

            match ident.to_string().as_str() {
                "verb" => verb = Some(value),
                "noun" => noun = Some(value),
                "description" => description = Some(value),
                other => {
                    return Err(syn::Error::new_spanned(
                        ident,
                        format!("unknown attribute: {}", other),
                    ))
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(OperationArgs {
            verb: verb.ok_or_else(|| input.error("missing 'verb' attribute"))?,
            noun: noun.ok_or_else(|| input.error("missing 'noun' attribute"))?,
            description: description.ok_or_else(|| input.error("missing 'description' attribute"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args: OperationArgs = syn::parse_str(
            r#"verb = "move", noun = "card", description = "Move a card""#,
        )
        .unwrap();
        assert_eq!(args.verb.value(), "move");
        assert_eq!(args.noun.value(), "card");
        assert_eq!(args.description.value(), "Move a card");
    }

    #[test]
    fn test_parse_args_any_order_trailing_comma() {
        let args: OperationArgs = syn::parse_str(
            r#"description = "Show the board", noun = "board", verb = "get","#,
        )
        .unwrap();
        assert_eq!(args.verb.value(), "get");
        assert_eq!(args.noun.value(), "board");
    }

    #[test]
    fn test_parse_args_rejects_bad_input() {
        let missing = syn::parse_str::<OperationArgs>(r#"verb = "add", noun = "lane""#);
        assert!(missing.is_err());

        let unknown = syn::parse_str::<OperationArgs>(
            r#"verb = "add", noun = "lane", description = "x", alias = "new""#,
        );
        assert!(unknown.is_err());

        let not_string = syn::parse_str::<OperationArgs>(
            r#"verb = 1, noun = "lane", description = "x""#,
        );
        assert!(not_string.is_err());

        let empty = syn::parse_str::<OperationArgs>(
            r#"verb = "", noun = "lane", description = "x""#,
        );
        assert!(empty.is_err());
    }
}
