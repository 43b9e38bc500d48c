//! Functionality related to retrieving fully-wired instances from a container.

pub use crate::error::InstantiationError;
use std::any::{type_name, Any, TypeId};
#[cfg(not(feature = "threadsafe"))]
use std::rc::Rc;
#[cfg(feature = "threadsafe")]
use std::sync::Arc;

#[cfg(not(feature = "threadsafe"))]
pub type InstancePtr<T> = Rc<T>;
#[cfg(feature = "threadsafe")]
pub type InstancePtr<T> = Arc<T>;

#[cfg(not(feature = "threadsafe"))]
pub type InstanceAnyPtr = InstancePtr<dyn Any + 'static>;
#[cfg(feature = "threadsafe")]
pub type InstanceAnyPtr = InstancePtr<dyn Any + Send + Sync + 'static>;

/// Casts a type-erased instance of an implementation type to a boxed `InstancePtr<Base>`, where
/// `Base` is the base type the implementation was bound to. Returns the source instance if the
/// cast is not possible.
pub type CastFunction = fn(instance: InstanceAnyPtr) -> Result<Box<dyn Any>, InstanceAnyPtr>;

/// Generic provider of fully-wired instances.
pub trait InstanceProvider {
    /// Creates (or reuses, for singletons) an instance of an implementation bound to the given base
    /// type, optionally disambiguated by tag. This is a top-level request - any resolution state
    /// from previous requests is discarded.
    fn instance(
        &mut self,
        base: TypeId,
        base_name: &str,
        tag: Option<&str>,
    ) -> Result<(InstanceAnyPtr, CastFunction), InstantiationError>;
}

/// Helper trait for [InstanceProvider] providing strongly-typed access.
pub trait TypedInstanceProvider {
    /// Typesafe version of [InstanceProvider::instance] without a tag.
    fn instance_typed<T: ?Sized + 'static>(
        &mut self,
    ) -> Result<InstancePtr<T>, InstantiationError>;

    /// Typesafe version of [InstanceProvider::instance] selecting the implementation bound under
    /// given tag.
    fn instance_tagged<T: ?Sized + 'static>(
        &mut self,
        tag: &str,
    ) -> Result<InstancePtr<T>, InstantiationError>;
}

impl<IP: InstanceProvider + ?Sized> TypedInstanceProvider for IP {
    #[inline]
    fn instance_typed<T: ?Sized + 'static>(
        &mut self,
    ) -> Result<InstancePtr<T>, InstantiationError> {
        self.instance(TypeId::of::<T>(), type_name::<T>(), None)
            .and_then(cast_instance)
    }

    #[inline]
    fn instance_tagged<T: ?Sized + 'static>(
        &mut self,
        tag: &str,
    ) -> Result<InstancePtr<T>, InstantiationError> {
        self.instance(TypeId::of::<T>(), type_name::<T>(), Some(tag))
            .and_then(cast_instance)
    }
}

/// Applies the cast function and unwraps the resulting `InstancePtr<T>`.
pub fn cast_instance<T: ?Sized + 'static>(
    (instance, cast): (InstanceAnyPtr, CastFunction),
) -> Result<InstancePtr<T>, InstantiationError> {
    cast(instance)
        .map_err(|_| InstantiationError::IncompatibleInstance(type_name::<T>().to_string()))
        .and_then(|dependency| cast_dependency(dependency))
}

/// Unwraps a boxed `InstancePtr<T>` produced by a [CastFunction].
pub fn cast_dependency<T: ?Sized + 'static>(
    dependency: Box<dyn Any>,
) -> Result<InstancePtr<T>, InstantiationError> {
    dependency
        .downcast::<InstancePtr<T>>()
        .map(|instance| *instance)
        .map_err(|_| InstantiationError::IncompatibleInstance(type_name::<T>().to_string()))
}
