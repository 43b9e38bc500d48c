//! Functionality related to registering bindings - associations between a base type, an optional
//! tag and an implementation type. Tags are unique per base type, which is enforced eagerly, so
//! resolution only needs to reject requests without a tag when multiple implementations exist.
//!
//! Bindings can be registered manually:
//!
//! ```
//! use tagwire_di::binding_registry::BindingRegistry;
//! use tagwire_di::metadata::{Injectable, InstanceBox, TypeMetadata};
//!
//! struct Engine;
//!
//! impl Injectable for Engine {
//!     fn metadata() -> TypeMetadata {
//!         TypeMetadata::new::<Self>().with_default_constructor(|| Box::new(Engine) as InstanceBox)
//!     }
//! }
//!
//! let mut registry = BindingRegistry::default();
//! registry.register::<Engine, Engine>().unwrap();
//! assert!(registry.register_tagged::<Engine, Engine>(None).is_err());
//! ```
//!
//! or collected from all types using `#[derive(Injectable)]` and `#[binding]` with
//! [BindingRegistry::from_inventory].

use crate::binding_registry::internal::BindingRegisterer;
use crate::error::{InstantiationError, RegistrationError};
use crate::instance_provider::{CastFunction, InstanceAnyPtr};
use crate::metadata::{Downcast, Injectable, TypeMetadata};
use derivative::Derivative;
use fxhash::FxHashMap;
use itertools::Itertools;
use std::any::{type_name, Any, TypeId};
use std::sync::Arc;
use tracing::{debug, trace};

/// A registered implementation for a base type.
#[derive(Derivative, Clone, Copy)]
#[derivative(Debug)]
pub struct Binding {
    pub implementation: TypeId,
    pub implementation_name: &'static str,

    /// Converts an instance of the implementation to an instance of the base type.
    #[derivative(Debug = "ignore")]
    pub cast: CastFunction,
}

#[derive(Clone, Debug)]
struct BindingSet {
    base_name: &'static str,
    bindings: FxHashMap<Option<String>, Binding>,
}

/// Registry of bindings, along with metadata for all registered implementations.
#[derive(Clone, Debug, Default)]
pub struct BindingRegistry {
    bindings: FxHashMap<TypeId, BindingSet>,
    implementations: FxHashMap<TypeId, Arc<TypeMetadata>>,
}

fn cast<Base: Downcast<I> + ?Sized, I: Injectable>(
    instance: InstanceAnyPtr,
) -> Result<Box<dyn Any>, InstanceAnyPtr> {
    Base::downcast(instance).map(|instance| Box::new(instance) as Box<dyn Any>)
}

impl BindingRegistry {
    /// Creates a registry containing all bindings submitted by `#[derive(Injectable)]` and
    /// `#[binding]`. Fails on the first duplicate tag for a base type.
    pub fn from_inventory() -> Result<Self, RegistrationError> {
        let mut registry = Self::default();

        for definition in inventory::iter::<BindingRegisterer>
            .into_iter()
            .map(|registerer| (registerer.register)())
        {
            let metadata = (definition.metadata)();
            let tag = metadata.tag.clone();

            registry.register_binding(
                definition.base,
                definition.base_name,
                metadata,
                tag.as_deref(),
                definition.cast,
            )?;
        }

        Ok(registry)
    }

    /// Registers `I` as an implementation of `Base` under the tag declared in its metadata.
    pub fn register<Base: Downcast<I> + ?Sized, I: Injectable>(
        &mut self,
    ) -> Result<(), RegistrationError> {
        let metadata = I::metadata();
        let tag = metadata.tag.clone();
        self.register_binding(
            TypeId::of::<Base>(),
            type_name::<Base>(),
            metadata,
            tag.as_deref(),
            cast::<Base, I>,
        )
    }

    /// Registers `I` as an implementation of `Base` under an explicit tag, ignoring the one
    /// declared in its metadata. `None` stands for no tag.
    pub fn register_tagged<Base: Downcast<I> + ?Sized, I: Injectable>(
        &mut self,
        tag: Option<&str>,
    ) -> Result<(), RegistrationError> {
        self.register_binding(
            TypeId::of::<Base>(),
            type_name::<Base>(),
            I::metadata(),
            tag,
            cast::<Base, I>,
        )
    }

    /// Type-erased registration. The cast function must convert instances of the type described by
    /// `metadata` into boxed `InstancePtr<Base>`.
    pub fn register_binding(
        &mut self,
        base: TypeId,
        base_name: &'static str,
        metadata: TypeMetadata,
        tag: Option<&str>,
        cast: CastFunction,
    ) -> Result<(), RegistrationError> {
        if metadata.constructors.len() > 1 {
            return Err(RegistrationError::MultipleInjectableConstructors {
                implementation: metadata.type_name.to_string(),
            });
        }

        let tag = tag.map(str::to_string);
        let binding_set = self.bindings.entry(base).or_insert_with(|| BindingSet {
            base_name,
            bindings: Default::default(),
        });

        if binding_set.bindings.contains_key(&tag) {
            return Err(RegistrationError::AmbiguousBinding {
                base: base_name.to_string(),
                tag,
            });
        }

        debug!(
            base = base_name,
            implementation = metadata.type_name,
            ?tag,
            "Registering binding."
        );

        binding_set.bindings.insert(
            tag,
            Binding {
                implementation: metadata.type_id,
                implementation_name: metadata.type_name,
                cast,
            },
        );

        self.implementations
            .insert(metadata.type_id, Arc::new(metadata));
        Ok(())
    }

    /// Selects exactly one implementation for given base type. Without a tag, the only registered
    /// implementation is selected regardless of its tag. With a tag, only an implementation
    /// registered under that exact tag is selected.
    pub fn resolve(
        &self,
        base: TypeId,
        base_name: &str,
        tag: Option<&str>,
    ) -> Result<Binding, InstantiationError> {
        let binding_set =
            self.bindings
                .get(&base)
                .ok_or_else(|| InstantiationError::ImplementationNotFound {
                    base: base_name.to_string(),
                    tag: tag.map(str::to_string),
                })?;

        let binding = match tag {
            None => {
                if binding_set.bindings.len() != 1 {
                    return Err(InstantiationError::AmbiguousBinding {
                        base: binding_set.base_name.to_string(),
                        candidates: binding_set
                            .bindings
                            .values()
                            .map(|binding| binding.implementation_name.to_string())
                            .sorted()
                            .collect(),
                    });
                }

                binding_set.bindings.values().next()
            }
            Some(tag) => binding_set.bindings.get(&Some(tag.to_string())),
        };

        let binding = binding.ok_or_else(|| InstantiationError::ImplementationNotFound {
            base: binding_set.base_name.to_string(),
            tag: tag.map(str::to_string),
        })?;

        trace!(
            base = binding_set.base_name,
            implementation = binding.implementation_name,
            ?tag,
            "Resolved binding."
        );

        Ok(*binding)
    }

    /// Returns metadata of a registered implementation. Metadata is shared between clones of the
    /// registry and the instances being built.
    #[inline]
    pub fn implementation(&self, implementation: TypeId) -> Option<&Arc<TypeMetadata>> {
        self.implementations.get(&implementation)
    }

    /// Checks if given base type has any implementations.
    #[inline]
    pub fn is_registered(&self, base: TypeId) -> bool {
        self.bindings
            .get(&base)
            .map(|binding_set| !binding_set.bindings.is_empty())
            .unwrap_or(false)
    }

    /// Returns all bindings for given base type, sorted by tag.
    pub fn bindings(&self, base: TypeId) -> Vec<(Option<String>, Binding)> {
        self.bindings
            .get(&base)
            .map(|binding_set| {
                binding_set
                    .bindings
                    .iter()
                    .map(|(tag, binding)| (tag.clone(), *binding))
                    .sorted_by(|(left, _), (right, _)| left.cmp(right))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[doc(hidden)]
pub mod internal {
    use crate::instance_provider::CastFunction;
    use crate::metadata::TypeMetadata;
    use inventory::collect;
    pub use inventory::submit;
    use std::any::TypeId;

    #[derive(Clone)]
    pub struct BindingDefinition {
        pub base: TypeId,
        pub base_name: &'static str,
        pub metadata: fn() -> TypeMetadata,
        pub cast: CastFunction,
    }

    pub struct BindingRegisterer {
        pub register: fn() -> BindingDefinition,
    }

    collect!(BindingRegisterer);

    /// Cast function for generated code.
    pub fn cast<Base: crate::metadata::Downcast<I> + ?Sized, I: crate::metadata::Injectable>(
    ) -> CastFunction {
        super::cast::<Base, I>
    }
}
