use crate::attributes::{
    find_attribute, DefaultDefinition, FieldAttributes, InjectAttributes, StructAttributes,
    INJECT, INJECTABLE,
};
use itertools::Itertools;
use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::spanned::Spanned;
use syn::{Data, DataStruct, DeriveInput, Error, Field, Fields, Index, LitStr, Member, Result};

pub fn tag_tokens(tag: &Option<LitStr>) -> TokenStream {
    match tag {
        Some(tag) => quote!(::std::option::Option::Some(#tag)),
        None => quote!(::std::option::Option::None),
    }
}

struct InjectableField<'a> {
    member: Member,
    field: &'a Field,
    inject: Option<InjectAttributes>,
    default: Option<DefaultDefinition>,
}

impl<'a> InjectableField<'a> {
    fn parse(index: usize, field: &'a Field) -> Result<Self> {
        let member = field
            .ident
            .clone()
            .map(Member::Named)
            .unwrap_or_else(|| Member::Unnamed(Index::from(index)));

        let inject = find_attribute(&field.attrs, INJECT)
            .map(InjectAttributes::try_from)
            .transpose()?;

        let default = find_attribute(&field.attrs, INJECTABLE)
            .map(FieldAttributes::try_from)
            .transpose()?
            .and_then(|attributes| attributes.default);

        if inject.is_some() && default.is_some() {
            return Err(Error::new(
                field.span(),
                "Injected fields cannot have a default value!",
            ));
        }

        Ok(Self {
            member,
            field,
            inject,
            default,
        })
    }

    // None when the field cannot be initialized without arguments
    fn default_initialization(&self) -> Option<TokenStream> {
        let member = &self.member;
        match (&self.inject, &self.default) {
            (Some(_), _) => Some(quote!(#member: tagwire_di::metadata::Injected::empty())),
            (None, Some(DefaultDefinition::Default)) => {
                Some(quote!(#member: ::std::default::Default::default()))
            }
            (None, Some(DefaultDefinition::Expr(path))) => Some(quote!(#member: #path())),
            (None, None) => None,
        }
    }

    fn field_metadata(&self) -> Option<TokenStream> {
        let inject = self.inject.as_ref()?;
        let member = &self.member;
        let name = self.member.to_token_stream().to_string();
        let ty = &self.field.ty;
        let tag = tag_tokens(&inject.tag);

        Some(quote! {
            tagwire_di::metadata::FieldMetadata {
                name: #name,
                dependency: tagwire_di::metadata::ParameterMetadata::of::<<#ty as ::std::ops::Deref>::Target>(#tag),
                assign: |instance, dependency| {
                    tagwire_di::metadata::downcast_instance::<Self>(instance)?
                        .#member
                        .assign(dependency)
                },
            }
        })
    }
}

fn generate_default_constructor(fields: &[InjectableField]) -> TokenStream {
    let initializations: Option<Vec<_>> = fields
        .iter()
        .map(InjectableField::default_initialization)
        .collect();

    match initializations {
        Some(initializations) => quote! {
            let metadata = metadata.with_default_constructor(|| {
                ::std::boxed::Box::new(Self {
                    #(#initializations),*
                }) as tagwire_di::metadata::InstanceBox
            });
        },
        None => quote!(),
    }
}

pub fn expand_injectable(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(DataStruct { fields, .. }) = &input.data else {
        return Err(Error::new(
            input.span(),
            "Can only derive Injectable on structs!",
        ));
    };

    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "Generic types cannot be injectable!",
        ));
    }

    let ident = &input.ident;
    let attributes = find_attribute(&input.attrs, INJECTABLE)
        .map(StructAttributes::try_from)
        .transpose()?
        .unwrap_or_default();

    let fields: Vec<_> = match fields {
        Fields::Named(fields) => fields.named.iter().collect_vec(),
        Fields::Unnamed(fields) => fields.unnamed.iter().collect_vec(),
        Fields::Unit => vec![],
    }
    .into_iter()
    .enumerate()
    .map(|(index, field)| InjectableField::parse(index, field))
    .try_collect()?;

    let tag = attributes
        .tag
        .as_ref()
        .map(|tag| quote!(let metadata = metadata.with_tag(#tag);));
    let singleton = attributes
        .is_singleton
        .then(|| quote!(let metadata = metadata.singleton();));
    let default_constructor = generate_default_constructor(&fields);
    let field_metadata = fields
        .iter()
        .filter_map(InjectableField::field_metadata)
        .collect_vec();
    let injection_points = attributes.has_injection_points.then(|| {
        quote!(let metadata = <Self as tagwire_di::metadata::InjectionPoints>::injection_points(metadata);)
    });
    let declares_injection_points = attributes.has_injection_points.then(|| {
        quote! {
            #[automatically_derived]
            impl tagwire_di::metadata::DeclaresInjectionPoints for #ident {}
        }
    });

    Ok(quote! {
        #[automatically_derived]
        impl tagwire_di::metadata::Injectable for #ident {
            fn metadata() -> tagwire_di::metadata::TypeMetadata {
                let metadata = tagwire_di::metadata::TypeMetadata::new::<Self>();
                #tag
                #singleton
                #default_constructor
                #(let metadata = metadata.with_field(#field_metadata);)*
                #injection_points
                metadata
            }
        }

        #declares_injection_points

        const _: () = {
            fn register() -> tagwire_di::binding_registry::internal::BindingDefinition {
                tagwire_di::binding_registry::internal::BindingDefinition {
                    base: ::std::any::TypeId::of::<#ident>(),
                    base_name: ::std::any::type_name::<#ident>(),
                    metadata: <#ident as tagwire_di::metadata::Injectable>::metadata,
                    cast: tagwire_di::binding_registry::internal::cast::<#ident, #ident>(),
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
