//! The engine has no runtime reflection to rely on, so every implementation type describes its
//! injection points up front by implementing [Injectable]. The resulting [TypeMetadata] lists
//! injectable constructors, the optional zero-argument constructor, injectable fields and
//! injectable (setter) methods, together with type-erased functions invoking them.
//!
//! Metadata is usually generated by `#[derive(Injectable)]` and `#[injection_points]`, but can be
//! written by hand:
//!
//! ```
//! use tagwire_di::instance_provider::InstantiationError;
//! use tagwire_di::metadata::{
//!     take_dependency, ConstructorMetadata, Dependency, Injectable, InstanceBox,
//!     ParameterMetadata, TypeMetadata,
//! };
//! use tagwire_di::instance_provider::InstancePtr;
//!
//! struct Engine;
//!
//! impl Injectable for Engine {
//!     fn metadata() -> TypeMetadata {
//!         TypeMetadata::new::<Self>().with_default_constructor(|| Box::new(Engine) as InstanceBox)
//!     }
//! }
//!
//! struct Car {
//!     engine: InstancePtr<Engine>,
//! }
//!
//! impl Injectable for Car {
//!     fn metadata() -> TypeMetadata {
//!         TypeMetadata::new::<Self>().with_constructor(ConstructorMetadata {
//!             tag: None,
//!             parameters: vec![ParameterMetadata::of::<Engine>(None)],
//!             construct: |dependencies: Vec<Dependency>| {
//!                 let mut dependencies = dependencies.into_iter();
//!                 Ok(Box::new(Car {
//!                     engine: take_dependency::<Engine>(&mut dependencies)?,
//!                 }) as InstanceBox)
//!             },
//!         })
//!     }
//! }
//! ```

use crate::error::InstantiationError;
use crate::instance_provider::{cast_dependency, InstanceAnyPtr, InstancePtr};
use derivative::Derivative;
use std::any::{type_name, Any, TypeId};
use std::fmt::{Debug, Formatter};
use std::ops::Deref;

#[cfg(not(feature = "threadsafe"))]
pub type ErasedInstance = dyn Any;
#[cfg(feature = "threadsafe")]
pub type ErasedInstance = dyn Any + Send + Sync;

/// A type-erased instance which is still being built - owned exclusively, so fields and setters
/// can be injected.
pub type InstanceBox = Box<ErasedInstance>;

/// A resolved dependency - a boxed `InstancePtr<Base>` for the requested base type.
pub type Dependency = Box<dyn Any>;

pub type ConstructorFunction =
    fn(dependencies: Vec<Dependency>) -> Result<InstanceBox, InstantiationError>;

pub type DefaultConstructorFunction = fn() -> InstanceBox;

pub type AssignFunction =
    fn(instance: &mut ErasedInstance, dependency: Dependency) -> Result<(), InstantiationError>;

pub type InvokeFunction = fn(
    instance: &mut ErasedInstance,
    dependencies: Vec<Dependency>,
) -> Result<(), InstantiationError>;

/// Bounds every instance managed by the container must satisfy.
#[cfg(feature = "threadsafe")]
pub trait InstanceBound: Send + Sync + 'static {}
#[cfg(feature = "threadsafe")]
impl<T: Send + Sync + 'static> InstanceBound for T {}

/// Bounds every instance managed by the container must satisfy.
#[cfg(not(feature = "threadsafe"))]
pub trait InstanceBound: 'static {}
#[cfg(not(feature = "threadsafe"))]
impl<T: 'static> InstanceBound for T {}

/// A concrete, constructible implementation type. Typically derived with `#[derive(Injectable)]`.
pub trait Injectable: InstanceBound + Sized {
    /// Describes injection points of this type.
    fn metadata() -> TypeMetadata;
}

/// Injectable constructors and methods declared outside of the type definition. Implemented by the
/// `#[injection_points]` attribute on an inherent impl block, which only compiles for types deriving
/// `Injectable` with `#[injectable(injection_points)]`:
///
/// ```compile_fail
/// use tagwire_di::instance_provider::InstancePtr;
/// use tagwire_di::{injection_points, Injectable};
///
/// #[derive(Injectable)]
/// struct Engine;
///
/// #[derive(Injectable)]
/// struct Car {
///     #[injectable(default)]
///     engine: Option<InstancePtr<Engine>>,
/// }
///
/// #[injection_points]
/// impl Car {
///     #[inject]
///     fn set_engine(&mut self, engine: InstancePtr<Engine>) {
///         self.engine = Some(engine);
///     }
/// }
/// ```
pub trait InjectionPoints {
    /// Adds constructors and methods to given metadata.
    fn injection_points(metadata: TypeMetadata) -> TypeMetadata;
}

/// Marks types whose derived metadata includes their [InjectionPoints].
#[doc(hidden)]
pub trait DeclaresInjectionPoints: InjectionPoints {}

#[doc(hidden)]
#[inline]
pub fn assert_injection_points_declared<T: DeclaresInjectionPoints>() {}

/// Conversion from an implementation instance to a base type instance. Base types are usually
/// `dyn Trait`s, for which this trait is implemented by the `#[binding]` attribute. Every
/// [Injectable] is its own base type.
pub trait Downcast<I: Injectable>: 'static {
    fn downcast(source: InstanceAnyPtr) -> Result<InstancePtr<Self>, InstanceAnyPtr>;
}

impl<I: Injectable> Downcast<I> for I {
    #[inline]
    fn downcast(source: InstanceAnyPtr) -> Result<InstancePtr<Self>, InstanceAnyPtr> {
        source.downcast()
    }
}

/// A declared dependency - the requested base type with an optional tag.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ParameterMetadata {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub tag: Option<String>,
}

impl ParameterMetadata {
    pub fn of<T: ?Sized + 'static>(tag: Option<&str>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            tag: tag.map(str::to_string),
        }
    }
}

/// An injectable constructor.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct ConstructorMetadata {
    /// Tag applied to all parameters, taking precedence over parameter tags.
    pub tag: Option<String>,
    pub parameters: Vec<ParameterMetadata>,
    /// Creates the instance from dependencies resolved in parameter order.
    #[derivative(Debug = "ignore")]
    pub construct: ConstructorFunction,
}

/// An injectable field.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct FieldMetadata {
    pub name: &'static str,
    pub dependency: ParameterMetadata,
    #[derivative(Debug = "ignore")]
    pub assign: AssignFunction,
}

/// An injectable method, usually a setter.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct MethodMetadata {
    pub name: &'static str,
    /// Tag applied to all parameters, taking precedence over parameter tags.
    pub tag: Option<String>,
    pub parameters: Vec<ParameterMetadata>,
    #[derivative(Debug = "ignore")]
    pub invoke: InvokeFunction,
}

/// Injection points of an implementation type.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct TypeMetadata {
    pub type_id: TypeId,
    pub type_name: &'static str,

    /// Tag used when registering this implementation without an explicit one.
    pub tag: Option<String>,

    /// Singletons are created at most once per container.
    pub is_singleton: bool,

    pub constructors: Vec<ConstructorMetadata>,

    #[derivative(Debug = "ignore")]
    pub default_constructor: Option<DefaultConstructorFunction>,

    pub fields: Vec<FieldMetadata>,
    pub methods: Vec<MethodMetadata>,
}

impl TypeMetadata {
    /// Creates empty metadata for given type - no tag, not a singleton and without any way of
    /// constructing it.
    pub fn new<T: Injectable>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            tag: None,
            is_singleton: false,
            constructors: vec![],
            default_constructor: None,
            fields: vec![],
            methods: vec![],
        }
    }

    pub fn with_tag<T: ToString>(mut self, tag: T) -> Self {
        self.tag = Some(tag.to_string());
        self
    }

    pub fn singleton(mut self) -> Self {
        self.is_singleton = true;
        self
    }

    pub fn with_constructor(mut self, constructor: ConstructorMetadata) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub fn with_default_constructor(mut self, constructor: DefaultConstructorFunction) -> Self {
        self.default_constructor = Some(constructor);
        self
    }

    pub fn with_field(mut self, field: FieldMetadata) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: MethodMetadata) -> Self {
        self.methods.push(method);
        self
    }
}

/// Extracts the next dependency from a list resolved for a constructor or method.
pub fn take_dependency<T: ?Sized + 'static>(
    dependencies: &mut impl Iterator<Item = Dependency>,
) -> Result<InstancePtr<T>, InstantiationError> {
    dependencies
        .next()
        .ok_or_else(|| InstantiationError::IncompatibleInstance(type_name::<T>().to_string()))
        .and_then(cast_dependency::<T>)
}

/// Accesses an instance being built as its concrete type.
pub fn downcast_instance<T: 'static>(
    instance: &mut ErasedInstance,
) -> Result<&mut T, InstantiationError> {
    instance
        .downcast_mut()
        .ok_or_else(|| InstantiationError::IncompatibleInstance(type_name::<T>().to_string()))
}

/// Storage for a field injection point. Empty after default construction and filled during field
/// injection, before the instance is handed out by the container.
pub struct Injected<T: ?Sized>(Option<InstancePtr<T>>);

impl<T: ?Sized> Injected<T> {
    pub fn empty() -> Self {
        Self(None)
    }

    pub fn inject(&mut self, instance: InstancePtr<T>) {
        self.0 = Some(instance);
    }

    pub fn get(&self) -> Option<&InstancePtr<T>> {
        self.0.as_ref()
    }

    pub fn is_injected(&self) -> bool {
        self.0.is_some()
    }
}

impl<T: ?Sized + 'static> Injected<T> {
    /// Field injection entry point for generated code.
    pub fn assign(&mut self, dependency: Dependency) -> Result<(), InstantiationError> {
        self.inject(cast_dependency::<T>(dependency)?);
        Ok(())
    }
}

impl<T: ?Sized> Default for Injected<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: ?Sized> Clone for Injected<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: ?Sized> Debug for Injected<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Injected")
            .field("injected", &self.is_injected())
            .field("type", &type_name::<T>())
            .finish()
    }
}

impl<T: ?Sized> Deref for Injected<T> {
    type Target = T;

    /// # Panics
    ///
    /// Panics when accessed before injection, which cannot happen for instances returned by the
    /// container.
    fn deref(&self) -> &Self::Target {
        match &self.0 {
            Some(instance) => instance.as_ref(),
            None => panic!("Dependency of type {} accessed before injection", type_name::<T>()),
        }
    }
}
