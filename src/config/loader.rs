// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::config::consts::{
    DEFAULT_FUEL_LEVEL, DEFAULT_MAX_CODE_SIZE, DEFAULT_MAX_MODULE_SIZE, DEFAULT_SANDBOX_BASE_URL,
    MAX_FUEL_LEVEL, MIN_FUEL_LEVEL, SANDBOX_API_KEY_VAR,
};
use crate::errors::ConfigError;

/// Service configuration, typically loaded from a YAML file.
///
/// The remote credential may also arrive through the `SANDBOX_API_KEY`
/// environment variable, which overrides the file value. Credential presence
/// decides whether the remote backend provisions real sandboxes or runs in
/// demo mode.
///
/// # Example
/// ```yaml
/// limits:
///   max_code_size: 1048576
///   max_module_size: 16777216
///   fuel: 100000000
/// remote:
///   base_url: "https://api.sandbox.example.com/v1"
///   template: "python3"
/// ```
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
}

/// Resource ceilings applied to untrusted submissions.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum source snippet size in bytes.
    #[serde(default = "default_max_code_size")]
    pub max_code_size: usize,
    /// Maximum decoded WASM module size in bytes.
    #[serde(default = "default_max_module_size")]
    pub max_module_size: usize,
    /// Instruction budget for a single WASM execution.
    #[serde(default = "default_fuel")]
    pub fuel: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_code_size: DEFAULT_MAX_CODE_SIZE,
            max_module_size: DEFAULT_MAX_MODULE_SIZE,
            fuel: DEFAULT_FUEL_LEVEL,
        }
    }
}

/// Remote sandbox connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Provisioning credential. `None` selects demo mode.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Sandbox template identifier requested at provisioning time.
    #[serde(default = "default_template")]
    pub template: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_SANDBOX_BASE_URL.to_string(),
            template: default_template(),
        }
    }
}

fn default_max_code_size() -> usize {
    DEFAULT_MAX_CODE_SIZE
}

fn default_max_module_size() -> usize {
    DEFAULT_MAX_MODULE_SIZE
}

fn default_fuel() -> u64 {
    DEFAULT_FUEL_LEVEL
}

fn default_base_url() -> String {
    DEFAULT_SANDBOX_BASE_URL.to_string()
}

fn default_template() -> String {
    "python3".to_string()
}

impl Config {
    /// Overlay environment-sourced values onto the loaded configuration.
    /// Checked once when the service is wired, not per request.
    pub fn apply_env(mut self) -> Self {
        if let Ok(key) = std::env::var(SANDBOX_API_KEY_VAR) {
            if !key.trim().is_empty() {
                self.remote.api_key = Some(key);
            }
        }
        self
    }

    /// Validate resource ceilings against the allowed ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.fuel < MIN_FUEL_LEVEL || self.limits.fuel > MAX_FUEL_LEVEL {
            return Err(ConfigError::Validation(format!(
                "fuel must be between {} and {}, got {}",
                MIN_FUEL_LEVEL, MAX_FUEL_LEVEL, self.limits.fuel
            )));
        }
        if self.limits.max_code_size == 0 {
            return Err(ConfigError::Validation(
                "max_code_size must be non-zero".to_string(),
            ));
        }
        if self.limits.max_module_size == 0 {
            return Err(ConfigError::Validation(
                "max_module_size must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load configuration from a YAML file without validating it.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Load configuration, overlay the environment, and validate.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let config = load_config(path)?.apply_env();
    config.validate()?;
    Ok(config)
}
