//! Derive macros for the Tembea store framework
//!
//! Action enums mix commands (requests to change state) and events (facts
//! about what happened). The `#[derive(Action)]` macro generates the
//! classification helpers so reducers, logs, and tests can tell the two
//! apart without hand-written match tables.
//!
//! # Example
//!
//! ```ignore
//! use tembea_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! enum SessionAction {
//!     #[command]
//!     LogOut,
//!
//!     #[event]
//!     SignedOut,
//! }
//!
//! assert!(SessionAction::LogOut.is_command());
//! assert!(SessionAction::SignedOut.is_event());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, parse_macro_input};

/// Derive macro for Action enums
///
/// Generates helper methods for action enums:
/// - `is_command()` - Returns true if this variant is a command
/// - `is_event()` - Returns true if this variant is an event
/// - `action_name()` - Returns the variant name, for logs and serialization
///
/// # Attributes
///
/// - `#[command]` - Mark a variant as a command
/// - `#[event]` - Mark a variant as an event
///
/// Variants carrying neither attribute are reported by neither helper,
/// which is itself a useful smell test: every action should be one or the
/// other.
///
/// # Panics
///
/// This macro produces a compile error (not a runtime panic) if:
/// - Applied to a non-enum type
/// - A variant has both `#[command]` and `#[event]` attributes
#[proc_macro_derive(Action, attributes(command, event))]
#[allow(clippy::expect_used)] // Proc macro panics become compile errors, not runtime panics
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new_spanned(input, "#[derive(Action)] can only be used on enums")
            .to_compile_error()
            .into();
    };

    let mut command_variants = Vec::new();
    let mut event_variants = Vec::new();

    for variant in &data_enum.variants {
        let is_command = has_attribute(&variant.attrs, "command");
        let is_event = has_attribute(&variant.attrs, "event");

        if is_command && is_event {
            return syn::Error::new_spanned(
                variant,
                "Variant cannot be both #[command] and #[event]",
            )
            .to_compile_error()
            .into();
        }

        if is_command {
            command_variants.push(variant);
        }

        if is_event {
            event_variants.push(variant);
        }
    }

    // Match arms need the right pattern shape for each variant kind.
    let arm = |variant: &&syn::Variant, body: proc_macro2::TokenStream| {
        let ident = &variant.ident;
        match &variant.fields {
            Fields::Named(_) => quote! { Self::#ident { .. } => #body, },
            Fields::Unnamed(_) => quote! { Self::#ident(..) => #body, },
            Fields::Unit => quote! { Self::#ident => #body, },
        }
    };

    let is_command_arms = command_variants
        .iter()
        .map(|v| arm(v, quote! { true }))
        .collect::<Vec<_>>();

    let is_event_arms = event_variants
        .iter()
        .map(|v| arm(v, quote! { true }))
        .collect::<Vec<_>>();

    let name_arms = data_enum
        .variants
        .iter()
        .map(|variant| {
            let label = variant.ident.to_string();
            arm(&variant, quote! { #label })
        })
        .collect::<Vec<_>>();

    let expanded = quote! {
        impl #name {
            /// Returns true if this action is a command
            #[must_use]
            pub const fn is_command(&self) -> bool {
                match self {
                    #(#is_command_arms)*
                    _ => false,
                }
            }

            /// Returns true if this action is an event
            #[must_use]
            pub const fn is_event(&self) -> bool {
                match self {
                    #(#is_event_arms)*
                    _ => false,
                }
            }

            /// Returns the variant name, for logs and serialization
            #[must_use]
            pub const fn action_name(&self) -> &'static str {
                match self {
                    #(#name_arms)*
                }
            }
        }
    };

    TokenStream::from(expanded)
}

/// Helper function to check if an attribute list contains a specific attribute
fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}
