use proc_macro2::TokenStream;
use quote::quote;
use std::ops::Deref;
use syn::spanned::Spanned;
use syn::{Error, Item, Result, Type};

#[cfg(feature = "threadsafe")]
fn trait_object_bounds() -> TokenStream {
    quote!(+ Send + Sync)
}

#[cfg(not(feature = "threadsafe"))]
fn trait_object_bounds() -> TokenStream {
    quote!()
}

pub fn expand_binding(item: &Item) -> Result<TokenStream> {
    let Item::Impl(item_impl) = item else {
        return Err(Error::new(
            item.span(),
            "Bindings can only be declared on trait implementations!",
        ));
    };

    let trait_type = item_impl
        .trait_
        .as_ref()
        .map(|(_, path, ..)| path)
        .ok_or_else(|| Error::new(item.span(), "Missing trait identifier!"))?;

    let target_type = if let Type::Path(path) = item_impl.self_ty.deref() {
        &path.path
    } else {
        return Err(Error::new(
            item_impl.self_ty.span(),
            "Bindings are only available for injectable types!",
        ));
    };

    let bounds = trait_object_bounds();

    Ok(quote! {
        #item

        #[automatically_derived]
        impl tagwire_di::metadata::Downcast<#target_type> for dyn #trait_type #bounds {
            fn downcast(
                source: tagwire_di::instance_provider::InstanceAnyPtr,
            ) -> ::std::result::Result<tagwire_di::instance_provider::InstancePtr<Self>, tagwire_di::instance_provider::InstanceAnyPtr> {
                source
                    .downcast::<#target_type>()
                    .map(|instance| instance as tagwire_di::instance_provider::InstancePtr<Self>)
            }
        }

        const _: () = {
            fn register() -> tagwire_di::binding_registry::internal::BindingDefinition {
                tagwire_di::binding_registry::internal::BindingDefinition {
                    base: ::std::any::TypeId::of::<dyn #trait_type #bounds>(),
                    base_name: ::std::any::type_name::<dyn #trait_type #bounds>(),
                    metadata: <#target_type as tagwire_di::metadata::Injectable>::metadata,
                    cast: tagwire_di::binding_registry::internal::cast::<dyn #trait_type #bounds, #target_type>(),
                }
            }

            tagwire_di::binding_registry::internal::submit! {
                tagwire_di::binding_registry::internal::BindingRegisterer {
                    register
                }
            };
        };
    })
}
