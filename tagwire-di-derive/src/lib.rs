use crate::binding::expand_binding;
use crate::injectable::expand_injectable;
use crate::injection_points::expand_injection_points;
use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput, Error, Item, ItemImpl};

mod attributes;
mod binding;
mod injectable;
mod injection_points;

/// Derives [Injectable](../tagwire_di/metadata/trait.Injectable.html) metadata for a struct and
/// registers the struct as its own binding.
#[proc_macro_derive(Injectable, attributes(injectable, inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_injectable(&input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

/// Declares injectable constructors and setter methods in an inherent impl block.
#[proc_macro_attribute]
pub fn injection_points(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let item_impl = parse_macro_input!(item as ItemImpl);
    expand_injection_points(item_impl)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

/// Binds an injectable type to the `dyn Trait` it implements.
#[proc_macro_attribute]
pub fn binding(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let item = parse_macro_input!(item as Item);
    expand_binding(&item)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}
