use thiserror::Error;

fn display_tag(tag: &Option<String>) -> &str {
    tag.as_deref().unwrap_or("<none>")
}

/// Errors related to registering bindings.
#[derive(Error, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum RegistrationError {
    #[error("Implementation already registered for base type {base} with tag: {}", display_tag(.tag))]
    AmbiguousBinding { base: String, tag: Option<String> },
    #[error("Implementation {implementation} declares more than one injectable constructor")]
    MultipleInjectableConstructors { implementation: String },
}

/// Errors related to creating instances.
#[derive(Error, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum InstantiationError {
    #[error("Cannot find implementation for base type {base} with tag: {}", display_tag(.tag))]
    ImplementationNotFound { base: String, tag: Option<String> },
    #[error("Cannot choose implementation for base type {base} without a tag - candidates: {}", .candidates.join(", "))]
    AmbiguousBinding {
        base: String,
        candidates: Vec<String>,
    },
    #[error("Implementation {0} has neither an injectable constructor nor a default one")]
    NoDefaultConstructor(String),
    #[error("Detected cyclic dependency between: {}", .0.join(", "))]
    CyclicDependency(Vec<String>),
    #[error("Tried to downcast instance to incompatible type: {0}")]
    IncompatibleInstance(String),
    #[error("Missing metadata for registered implementation: {0}")]
    UnknownImplementation(String),
}

/// Errors related to loading [ContainerConfig](crate::config::ContainerConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error loading container configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Errors related to building a [Container](crate::container::Container).
#[derive(Error, Debug)]
pub enum ContainerBuilderError {
    #[error("Error registering bindings: {0}")]
    Registration(#[from] RegistrationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
