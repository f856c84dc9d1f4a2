//! Configuration file format (garnet.toml)
//!
//! The same layout is used for the project file and the user-level file;
//! every field is optional so that either can override only what it names.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Contents of a garnet.toml or ~/.garnet/config.toml file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Argument binding behaviour
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<BindingConfig>,

    /// Evaluation stack sizing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<StackConfig>,
}

/// `[binding]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct BindingConfig {
    /// Validate argument counts and required keywords before binding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict_arity: Option<bool>,
}

/// `[stack]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct StackConfig {
    /// Slots reserved up front (default: 1024)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_capacity: Option<usize>,

    /// Deepest call nesting allowed before a stack overflow (default: 10000)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_call_depth: Option<usize>,
}

impl ProjectConfig {
    /// Load a configuration file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate field values that TOML typing alone cannot reject
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(stack) = &self.stack {
            if stack.max_call_depth == Some(0) {
                return Err(ConfigError::InvalidValue {
                    field: "stack.max_call_depth".to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Merge another config into this one, field by field.
    /// Values set in `other` take precedence.
    pub fn merge(&mut self, other: &ProjectConfig) {
        if let Some(binding) = &other.binding {
            let ours = self.binding.get_or_insert_with(Default::default);
            if binding.strict_arity.is_some() {
                ours.strict_arity = binding.strict_arity;
            }
        }
        if let Some(stack) = &other.stack {
            let ours = self.stack.get_or_insert_with(Default::default);
            if stack.initial_capacity.is_some() {
                ours.initial_capacity = stack.initial_capacity;
            }
            if stack.max_call_depth.is_some() {
                ours.max_call_depth = stack.max_call_depth;
            }
        }
    }

    /// Whether strict arity checking was requested
    pub fn strict_arity(&self) -> Option<bool> {
        self.binding.as_ref().and_then(|b| b.strict_arity)
    }
}
