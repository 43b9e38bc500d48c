//! Core functionality for creating fully-wired instances.

use crate::binding_registry::BindingRegistry;
use crate::config::ContainerConfig;
use crate::cycle::ResolutionGuard;
use crate::error::{ContainerBuilderError, InstantiationError};
use crate::instance_provider::{
    CastFunction, InstanceAnyPtr, InstanceProvider, InstancePtr, TypedInstanceProvider,
};
use crate::metadata::{Dependency, InstanceBox, ParameterMetadata, TypeMetadata};
use crate::scope::{PrototypeScope, ScopePtr, SingletonScope};
use std::any::TypeId;
use tracing::{debug, trace};

/// Builder for [Container] with sensible defaults, for easy construction.
pub struct ContainerBuilder {
    registry: BindingRegistry,
    config: ContainerConfig,
    singleton_scope: ScopePtr,
    prototype_scope: ScopePtr,
}

impl ContainerBuilder {
    /// Creates a new builder with bindings collected from `#[derive(Injectable)]` and `#[binding]`
    /// and configuration read from the environment.
    pub fn new() -> Result<Self, ContainerBuilderError> {
        Ok(Self::empty()
            .with_registry(BindingRegistry::from_inventory()?)
            .with_config(ContainerConfig::init_from_environment()?))
    }

    /// Creates a new builder without any bindings and with default configuration.
    pub fn empty() -> Self {
        Self {
            registry: Default::default(),
            config: Default::default(),
            singleton_scope: Box::<SingletonScope>::default(),
            prototype_scope: Box::<PrototypeScope>::default(),
        }
    }

    /// Sets new [BindingRegistry].
    pub fn with_registry(mut self, registry: BindingRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Sets new [ContainerConfig].
    pub fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the scope used for implementations marked as singletons.
    pub fn with_singleton_scope(mut self, scope: ScopePtr) -> Self {
        self.singleton_scope = scope;
        self
    }

    /// Sets the scope used for all other implementations.
    pub fn with_prototype_scope(mut self, scope: ScopePtr) -> Self {
        self.prototype_scope = scope;
        self
    }

    /// Builds resulting [Container].
    pub fn build(self) -> Container {
        Container {
            registry: self.registry,
            guard: ResolutionGuard::new(&self.config),
            singleton_scope: self.singleton_scope,
            prototype_scope: self.prototype_scope,
        }
    }
}

/// Dependency injection container. Resolves implementations for requested base types using its
/// [BindingRegistry] and builds them, injecting dependencies into the constructor, then fields,
/// then setter methods.
///
/// Resolution state is kept in the container itself, so concurrent top-level requests need to be
/// serialized by the caller.
pub struct Container {
    registry: BindingRegistry,
    guard: ResolutionGuard,
    singleton_scope: ScopePtr,
    prototype_scope: ScopePtr,
}

impl Container {
    /// Creates a new container with built-in scopes.
    pub fn new(registry: BindingRegistry, config: ContainerConfig) -> Self {
        ContainerBuilder::empty()
            .with_registry(registry)
            .with_config(config)
            .build()
    }

    #[inline]
    pub fn registry(&self) -> &BindingRegistry {
        &self.registry
    }

    /// Creates an instance of the only implementation bound to `T`.
    #[inline]
    pub fn instantiate<T: ?Sized + 'static>(&mut self) -> Result<InstancePtr<T>, InstantiationError> {
        self.instance_typed()
    }

    /// Creates an instance of the implementation bound to `T` under given tag.
    #[inline]
    pub fn instantiate_tagged<T: ?Sized + 'static>(
        &mut self,
        tag: &str,
    ) -> Result<InstancePtr<T>, InstantiationError> {
        self.instance_tagged(tag)
    }

    fn instantiate_internal(
        &mut self,
        base: TypeId,
        base_name: &str,
        tag: Option<&str>,
    ) -> Result<(InstanceAnyPtr, CastFunction), InstantiationError> {
        let binding = self.registry.resolve(base, base_name, tag)?;
        let metadata = self
            .registry
            .implementation(binding.implementation)
            .cloned()
            .ok_or_else(|| {
                InstantiationError::UnknownImplementation(binding.implementation_name.to_string())
            })?;

        self.guard.enter(&metadata)?;
        let instance = self.provide_instance(&metadata);
        self.guard.leave(&metadata);

        instance.map(|instance| (instance, binding.cast))
    }

    fn provide_instance(
        &mut self,
        metadata: &TypeMetadata,
    ) -> Result<InstanceAnyPtr, InstantiationError> {
        if let Some(instance) = self.scope(metadata).instance(metadata) {
            trace!(implementation = metadata.type_name, "Reusing singleton instance.");
            return Ok(instance);
        }

        let instance = self.build_instance(metadata)?;
        self.scope(metadata)
            .store_instance(metadata, instance.clone());

        Ok(instance)
    }

    fn scope(&mut self, metadata: &TypeMetadata) -> &mut ScopePtr {
        if metadata.is_singleton {
            &mut self.singleton_scope
        } else {
            &mut self.prototype_scope
        }
    }

    fn build_instance(
        &mut self,
        metadata: &TypeMetadata,
    ) -> Result<InstanceAnyPtr, InstantiationError> {
        trace!(implementation = metadata.type_name, "Building instance.");

        let mut instance: InstanceBox = if let Some(constructor) = metadata.constructors.first() {
            let dependencies =
                self.resolve_parameters(constructor.tag.as_deref(), &constructor.parameters)?;
            (constructor.construct)(dependencies)?
        } else {
            let constructor = metadata.default_constructor.ok_or_else(|| {
                InstantiationError::NoDefaultConstructor(metadata.type_name.to_string())
            })?;
            constructor()
        };

        for field in &metadata.fields {
            trace!(
                implementation = metadata.type_name,
                field = field.name,
                "Injecting field."
            );

            let dependency =
                self.resolve_dependency(&field.dependency, field.dependency.tag.as_deref())?;
            (field.assign)(instance.as_mut(), dependency)?;
        }

        for method in &metadata.methods {
            trace!(
                implementation = metadata.type_name,
                method = method.name,
                "Injecting method."
            );

            let dependencies = self.resolve_parameters(method.tag.as_deref(), &method.parameters)?;
            (method.invoke)(instance.as_mut(), dependencies)?;
        }

        Ok(InstanceAnyPtr::from(instance))
    }

    fn resolve_parameters(
        &mut self,
        injection_point_tag: Option<&str>,
        parameters: &[ParameterMetadata],
    ) -> Result<Vec<Dependency>, InstantiationError> {
        parameters
            .iter()
            .map(|parameter| {
                self.resolve_dependency(
                    parameter,
                    injection_point_tag.or(parameter.tag.as_deref()),
                )
            })
            .collect()
    }

    fn resolve_dependency(
        &mut self,
        parameter: &ParameterMetadata,
        tag: Option<&str>,
    ) -> Result<Dependency, InstantiationError> {
        let (instance, cast) = self.instantiate_internal(parameter.type_id, parameter.type_name, tag)?;
        cast(instance)
            .map_err(|_| InstantiationError::IncompatibleInstance(parameter.type_name.to_string()))
    }
}

impl InstanceProvider for Container {
    fn instance(
        &mut self,
        base: TypeId,
        base_name: &str,
        tag: Option<&str>,
    ) -> Result<(InstanceAnyPtr, CastFunction), InstantiationError> {
        debug!(base = base_name, ?tag, "Instantiating.");

        self.guard.reset();
        self.instantiate_internal(base, base_name, tag)
    }
}
