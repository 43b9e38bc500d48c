//! Container configuration. By default, the config is created with opinionated default values,
//! which can then be overwritten by environment variables prefixed with `TAGWIRE_` or a
//! `tagwire.json` file.

use crate::error::ConfigError;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

const CONFIG_ENV_PREFIX: &str = "TAGWIRE";

/// Name of the default config file.
pub const CONFIG_FILE: &str = "tagwire.json";

/// Default bound for [CycleDetection::RecursionCounter].
pub const DEFAULT_RECURSION_BOUND: u32 = 32;

/// Strategy for detecting dependency cycles during a single top-level instantiation.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum CycleDetection {
    /// Track implementations currently being built and fail as soon as one is requested again.
    /// Reports exactly the implementations forming the cycle.
    #[default]
    ResolutionPath,
    /// Count how many times each implementation is resolved and fail when any count exceeds the
    /// configured bound. Reports every implementation whose count is within one of the bound.
    RecursionCounter,
}

#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContainerConfig {
    pub cycle_detection: CycleDetection,
    /// Only used by [CycleDetection::RecursionCounter].
    pub recursion_bound: u32,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            cycle_detection: CycleDetection::default(),
            recursion_bound: DEFAULT_RECURSION_BOUND,
        }
    }
}

impl From<OptionalContainerConfig> for ContainerConfig {
    fn from(value: OptionalContainerConfig) -> Self {
        let default = Self::default();
        Self {
            cycle_detection: value.cycle_detection.unwrap_or(default.cycle_detection),
            recursion_bound: value.recursion_bound.unwrap_or(default.recursion_bound),
        }
    }
}

impl ContainerConfig {
    pub fn new(cycle_detection: CycleDetection, recursion_bound: u32) -> Self {
        Self {
            cycle_detection,
            recursion_bound,
        }
    }

    /// Reads configuration from [CONFIG_FILE] (if present) and `TAGWIRE_` environment variables.
    pub fn init_from_environment() -> Result<Self, ConfigError> {
        Self::init_from_config(
            Config::builder()
                .add_source(File::with_name(CONFIG_FILE).required(false))
                .add_source(Environment::with_prefix(CONFIG_ENV_PREFIX)),
        )
    }

    fn init_from_config(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder
            .build()
            .and_then(|config| config.try_deserialize::<OptionalContainerConfig>())
            .map(|config| config.into())
            .map_err(ConfigError::from)
    }
}

#[derive(Deserialize)]
struct OptionalContainerConfig {
    cycle_detection: Option<CycleDetection>,
    recursion_bound: Option<u32>,
}

#[cfg(test)]
mod tests {
    use crate::config::{ContainerConfig, CycleDetection, DEFAULT_RECURSION_BOUND};
    use config::{Config, File, FileFormat};

    #[test]
    fn should_fill_missing_values_with_defaults() {
        let config = ContainerConfig::init_from_config(
            Config::builder().add_source(File::from_str("{}", FileFormat::Json)),
        )
        .unwrap();

        assert_eq!(config, ContainerConfig::default());
        assert_eq!(config.recursion_bound, DEFAULT_RECURSION_BOUND);
        assert_eq!(config.cycle_detection, CycleDetection::ResolutionPath);
    }

    #[test]
    fn should_read_values() {
        let config = ContainerConfig::init_from_config(Config::builder().add_source(
            File::from_str(
                r#"{"cycle_detection": "recursion_counter", "recursion_bound": 8}"#,
                FileFormat::Json,
            ),
        ))
        .unwrap();

        assert_eq!(
            config,
            ContainerConfig::new(CycleDetection::RecursionCounter, 8)
        );
    }

    #[test]
    fn should_reject_unknown_strategy() {
        assert!(ContainerConfig::init_from_config(Config::builder().add_source(
            File::from_str(r#"{"cycle_detection": "graph"}"#, FileFormat::Json),
        ))
        .is_err());
    }
}
