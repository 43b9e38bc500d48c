use crate::attributes::{parse_tag, InjectAttributes, INJECT, TAG};
use crate::injectable::tag_tokens;
use itertools::Itertools;
use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{
    Error, FnArg, ImplItem, ImplItemFn, ItemImpl, Result, ReturnType, Type, TypePath,
};

struct InjectionPoint {
    tokens: TokenStream,
    is_constructor: bool,
}

fn returns_self(method: &ImplItemFn, self_ty: &Type) -> bool {
    match &method.sig.output {
        ReturnType::Type(_, ty) => match ty.as_ref() {
            Type::Path(TypePath { qself: None, path }) if path.is_ident("Self") => true,
            ty => quote!(#ty).to_string() == quote!(#self_ty).to_string(),
        },
        ReturnType::Default => false,
    }
}

// strips #[tag] attributes and returns parameter metadata tokens
fn extract_parameters(method: &mut ImplItemFn) -> Result<Vec<TokenStream>> {
    method
        .sig
        .inputs
        .iter_mut()
        .filter_map(|input| match input {
            FnArg::Typed(input) => Some(input),
            FnArg::Receiver(_) => None,
        })
        .map(|input| -> Result<TokenStream> {
            let tag = input
                .attrs
                .iter()
                .filter(|attribute| attribute.path().is_ident(TAG))
                .map(parse_tag)
                .next()
                .transpose()?;

            input
                .attrs
                .retain(|attribute| !attribute.path().is_ident(TAG));

            let ty = &input.ty;
            let tag = tag_tokens(&tag);
            Ok(quote! {
                tagwire_di::metadata::ParameterMetadata::of::<<#ty as ::std::ops::Deref>::Target>(#tag)
            })
        })
        .try_collect()
}

fn generate_injection_point(
    method: &mut ImplItemFn,
    self_ty: &Type,
) -> Result<Option<InjectionPoint>> {
    let Some(inject) = method
        .attrs
        .iter()
        .find(|attribute| attribute.path().is_ident(INJECT))
        .map(InjectAttributes::try_from)
        .transpose()?
    else {
        return Ok(None);
    };

    method
        .attrs
        .retain(|attribute| !attribute.path().is_ident(INJECT));

    let parameters = extract_parameters(method)?;
    let arguments = parameters
        .iter()
        .map(|_| quote!(tagwire_di::metadata::take_dependency(&mut dependencies)?))
        .collect_vec();

    let ident = &method.sig.ident;
    let name = ident.to_string();
    let tag = match &inject.tag {
        Some(tag) => quote!(::std::option::Option::Some(#tag.to_string())),
        None => quote!(::std::option::Option::None),
    };

    match method.sig.receiver() {
        None => {
            if !returns_self(method, self_ty) {
                return Err(Error::new(
                    method.sig.span(),
                    "Injectable constructors must return Self!",
                ));
            }

            Ok(Some(InjectionPoint {
                tokens: quote! {
                    tagwire_di::metadata::ConstructorMetadata {
                        tag: #tag,
                        parameters: vec![#(#parameters),*],
                        construct: |dependencies| {
                            #[allow(unused_mut, unused_variables)]
                            let mut dependencies = dependencies.into_iter();
                            ::std::result::Result::Ok(::std::boxed::Box::new(
                                Self::#ident(#(#arguments),*)
                            ) as tagwire_di::metadata::InstanceBox)
                        },
                    }
                },
                is_constructor: true,
            }))
        }
        Some(receiver) if receiver.reference.is_some() && receiver.mutability.is_some() => {
            Ok(Some(InjectionPoint {
                tokens: quote! {
                    tagwire_di::metadata::MethodMetadata {
                        name: #name,
                        tag: #tag,
                        parameters: vec![#(#parameters),*],
                        invoke: |instance, dependencies| {
                            #[allow(unused_mut, unused_variables)]
                            let mut dependencies = dependencies.into_iter();
                            tagwire_di::metadata::downcast_instance::<Self>(instance)?
                                .#ident(#(#arguments),*);
                            ::std::result::Result::Ok(())
                        },
                    }
                },
                is_constructor: false,
            }))
        }
        Some(receiver) => Err(Error::new(
            receiver.span(),
            "Injectable methods must take &mut self!",
        )),
    }
}

pub fn expand_injection_points(mut item_impl: ItemImpl) -> Result<TokenStream> {
    if let Some((_, path, _)) = &item_impl.trait_ {
        return Err(Error::new(
            path.span(),
            "Injection points can only be declared in inherent impl blocks!",
        ));
    }

    let self_ty = item_impl.self_ty.as_ref().clone();
    let injection_points: Vec<_> = item_impl
        .items
        .iter_mut()
        .filter_map(|item| match item {
            ImplItem::Fn(method) => Some(method),
            _ => None,
        })
        .map(|method| generate_injection_point(method, &self_ty))
        .filter_map_ok(|injection_point| injection_point)
        .try_collect()?;

    let constructors = injection_points
        .iter()
        .filter(|injection_point| injection_point.is_constructor)
        .map(|injection_point| &injection_point.tokens);
    let methods = injection_points
        .iter()
        .filter(|injection_point| !injection_point.is_constructor)
        .map(|injection_point| &injection_point.tokens);

    Ok(quote! {
        #item_impl

        #[automatically_derived]
        impl tagwire_di::metadata::InjectionPoints for #self_ty {
            fn injection_points(
                metadata: tagwire_di::metadata::TypeMetadata,
            ) -> tagwire_di::metadata::TypeMetadata {
                metadata
                    #(.with_constructor(#constructors))*
                    #(.with_method(#methods))*
            }
        }

        // derived metadata needs #[injectable(injection_points)] to pick these up
        const _: fn() = tagwire_di::metadata::assert_injection_points_declared::<#self_ty>;
    })
}
