//! Dependency injection container resolving implementations of base types (usually `dyn Trait`s)
//! and building fully-wired instances of them.
//!
//! Implementations are bound to base types in a [BindingRegistry](binding_registry::BindingRegistry),
//! optionally under a tag, which selects between multiple implementations of the same base type.
//! A [Container](container::Container) then resolves requested types and builds them, injecting
//! dependencies into constructors, fields and setter methods described by
//! [Injectable](metadata::Injectable) metadata.
//!
//! The example below relies on the default `threadsafe` and `derive` features:
//!
#![cfg_attr(all(feature = "derive", feature = "threadsafe"), doc = "```")]
#![cfg_attr(
    not(all(feature = "derive", feature = "threadsafe")),
    doc = "```ignore"
)]
//! use tagwire_di::container::ContainerBuilder;
//! use tagwire_di::instance_provider::InstancePtr;
//! use tagwire_di::metadata::Injected;
//! use tagwire_di::{binding, injection_points, Injectable};
//!
//! trait Operator {
//!     fn act(&self, a: i32, b: i32) -> i32;
//! }
//!
//! #[derive(Injectable)]
//! #[injectable(tag = "add")]
//! struct AddOperator;
//!
//! #[binding]
//! impl Operator for AddOperator {
//!     fn act(&self, a: i32, b: i32) -> i32 {
//!         a + b
//!     }
//! }
//!
//! #[derive(Injectable)]
//! #[injectable(injection_points)]
//! struct Calculator {
//!     #[inject(tag = "add")]
//!     add: Injected<dyn Operator + Send + Sync>,
//!     #[injectable(default)]
//!     offset: i32,
//! }
//!
//! #[injection_points]
//! impl Calculator {
//!     #[inject]
//!     fn set_offset(&mut self, #[tag = "add"] operator: InstancePtr<dyn Operator + Send + Sync>) {
//!         self.offset = operator.act(0, 1);
//!     }
//! }
//!
//! let mut container = ContainerBuilder::new().unwrap().build();
//! let calculator = container.instantiate::<Calculator>().unwrap();
//! assert_eq!(calculator.add.act(2, 3) + calculator.offset, 6);
//! ```
//!
//! ### Features
//!
//! * `threadsafe` - use threadsafe pointers and `Send + Sync` trait bounds
//! * `derive` - automatically derive [Injectable](metadata::Injectable) metadata

pub mod binding_registry;
pub mod config;
pub mod container;
pub mod cycle;
mod error;
pub mod instance_provider;
pub mod metadata;
pub mod scope;

pub use error::{ConfigError, ContainerBuilderError, InstantiationError, RegistrationError};

#[cfg(feature = "derive")]
pub use tagwire_di_derive::{binding, injection_points, Injectable};
