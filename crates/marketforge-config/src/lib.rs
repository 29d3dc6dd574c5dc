//! Configuration system for MarketForge.
//!
//! Load engine configuration from TOML or YAML files to tune safety limits,
//! expansion and validation behaviour without code changes. The legal
//! priority order of the allocation phases is fixed and not configurable.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use marketforge_config::{EngineConfig, EnvironmentMode};
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     environment_mode = "full_assert"
//!     iteration_limit = 250
//!
//!     [expansion]
//!     enabled = true
//!
//!     [validation]
//!     corrective_pass = false
//! "#).unwrap();
//!
//! assert_eq!(config.environment_mode, EnvironmentMode::FullAssert);
//! assert_eq!(config.iteration_limit, 250);
//! assert!(!config.validation.corrective_pass);
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use marketforge_config::EngineConfig;
//!
//! let config = EngineConfig::load("engine.toml").unwrap_or_default();
//! assert_eq!(config.iteration_limit, 1000);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default ceiling for every fixed-point loop.
pub const DEFAULT_ITERATION_LIMIT: usize = 1000;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Environment mode controlling invariant assertions.
    #[serde(default)]
    pub environment_mode: EnvironmentMode,

    /// Safety ceiling for the expansion and relocation loops.
    #[serde(default = "default_iteration_limit")]
    pub iteration_limit: usize,

    /// Overrides the market's own stands-per-merchant limit.
    #[serde(default)]
    pub max_stands_per_merchant: Option<usize>,

    /// Maximum for required categories that define none.
    #[serde(default)]
    pub default_category_maximum: Option<usize>,

    /// Expansion round configuration.
    #[serde(default)]
    pub expansion: ExpansionConfig,

    /// Validation and reclaim configuration.
    #[serde(default)]
    pub validation: ValidationConfig,
}

fn default_iteration_limit() -> usize {
    DEFAULT_ITERATION_LIMIT
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            environment_mode: EnvironmentMode::default(),
            iteration_limit: DEFAULT_ITERATION_LIMIT,
            max_stands_per_merchant: None,
            default_category_maximum: None,
            expansion: ExpansionConfig::default(),
            validation: ValidationConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()
    }

    /// Sets the environment mode.
    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    /// Sets the fixed-point iteration ceiling.
    pub fn with_iteration_limit(mut self, limit: usize) -> Self {
        self.iteration_limit = limit;
        self
    }

    /// Overrides the stands-per-merchant limit.
    pub fn with_max_stands_per_merchant(mut self, limit: usize) -> Self {
        self.max_stands_per_merchant = Some(limit);
        self
    }

    /// Sets the fallback maximum for required categories.
    pub fn with_default_category_maximum(mut self, maximum: usize) -> Self {
        self.default_category_maximum = Some(maximum);
        self
    }

    /// Enables or disables the expansion rounds.
    pub fn with_expansion(mut self, enabled: bool) -> Self {
        self.expansion.enabled = enabled;
        self
    }

    /// Returns true if invariants are re-checked after every phase.
    pub fn asserts_every_phase(&self) -> bool {
        self.environment_mode == EnvironmentMode::FullAssert
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.iteration_limit == 0 {
            return Err(ConfigError::Invalid(
                "iteration_limit must be at least 1".to_string(),
            ));
        }
        if self.max_stands_per_merchant == Some(0) {
            return Err(ConfigError::Invalid(
                "max_stands_per_merchant must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Environment mode affecting engine checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMode {
    /// Invariants checked once, at the end of the run.
    #[default]
    Production,

    /// Invariants checked after every phase.
    FullAssert,
}

/// Expansion round configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ExpansionConfig {
    /// Whether allocated merchants grow toward their maximum.
    #[serde(default = "enabled")]
    pub enabled: bool,

    /// Whether holders reserve their expansion stands before applicants
    /// are placed.
    #[serde(default = "enabled")]
    pub reserve_for_holders: bool,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reserve_for_holders: true,
        }
    }
}

/// Validation and reclaim configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ValidationConfig {
    /// Revert allocations below minimum or outside preferences.
    #[serde(default = "enabled")]
    pub reclaim: bool,

    /// Run one more allocation pass after reverting.
    #[serde(default = "enabled")]
    pub corrective_pass: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            reclaim: true,
            corrective_pass: true,
        }
    }
}

fn enabled() -> bool {
    true
}
