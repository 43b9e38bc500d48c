//! Instances are contained in [Scope]s - containers which decide when to reuse or create an
//! instance. Implementations marked as singletons live in the [SingletonScope], all others in the
//! [PrototypeScope], which creates a new instance on each request.
//!
//! Note: scope resolution happens at instantiation time, so a singleton can depend on a
//! non-singleton one. In such case a new instance of the dependency is created when building the
//! singleton, but then that single instance lives as long as the singleton lives.

use crate::instance_provider::InstanceAnyPtr;
use crate::metadata::TypeMetadata;
use fxhash::FxHashMap;
#[cfg(test)]
use mockall::automock;
use std::any::TypeId;

#[cfg(not(feature = "threadsafe"))]
pub type ScopePtr = Box<dyn Scope>;
#[cfg(feature = "threadsafe")]
pub type ScopePtr = Box<dyn Scope + Send + Sync>;

/// A scope containing instances. See module documentation for information on scopes.
#[cfg_attr(test, automock)]
pub trait Scope {
    /// Gets an instance of the given implementation, if available in this scope.
    fn instance(&self, metadata: &TypeMetadata) -> Option<InstanceAnyPtr>;

    /// Stores a fully-built instance in the scope. The scope might not support storing instances
    /// and ignore it.
    fn store_instance(&mut self, metadata: &TypeMetadata, instance: InstanceAnyPtr);
}

/// Scope for instances shared between dependents. Instances are never evicted.
#[derive(Default)]
pub struct SingletonScope {
    instances: FxHashMap<TypeId, InstanceAnyPtr>,
}

impl Scope for SingletonScope {
    #[inline]
    fn instance(&self, metadata: &TypeMetadata) -> Option<InstanceAnyPtr> {
        self.instances.get(&metadata.type_id).cloned()
    }

    #[inline]
    fn store_instance(&mut self, metadata: &TypeMetadata, instance: InstanceAnyPtr) {
        self.instances.entry(metadata.type_id).or_insert(instance);
    }
}

/// A scope which creates a new instance on each request.
#[derive(Default, Copy, Clone, Eq, PartialEq)]
pub struct PrototypeScope;

impl Scope for PrototypeScope {
    #[inline]
    fn instance(&self, _metadata: &TypeMetadata) -> Option<InstanceAnyPtr> {
        None
    }

    #[inline]
    fn store_instance(&mut self, _metadata: &TypeMetadata, _instance: InstanceAnyPtr) {}
}
