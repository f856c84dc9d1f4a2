//! Resolved runtime settings

use crate::project::ProjectConfig;

/// Default number of stack slots reserved when a VM is created
pub const DEFAULT_STACK_CAPACITY: usize = 1024;

/// Default limit on nested calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;

/// Settings consumed by the VM, with every default applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Run arity and required-keyword checks before binding arguments
    pub strict_arity: bool,
    /// Slots reserved on the evaluation stack up front
    pub stack_capacity: usize,
    /// Deepest call nesting allowed
    pub max_call_depth: usize,
}

impl RuntimeConfig {
    /// Resolve a (possibly partial) file configuration
    pub fn from_project(config: &ProjectConfig) -> Self {
        let defaults = Self::default();
        let stack = config.stack.as_ref();
        Self {
            strict_arity: config.strict_arity().unwrap_or(defaults.strict_arity),
            stack_capacity: stack
                .and_then(|s| s.initial_capacity)
                .unwrap_or(defaults.stack_capacity),
            max_call_depth: stack
                .and_then(|s| s.max_call_depth)
                .unwrap_or(defaults.max_call_depth),
        }
    }

    /// Same settings with strict arity checking turned on
    pub fn strict(mut self) -> Self {
        self.strict_arity = true;
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            strict_arity: false,
            stack_capacity: DEFAULT_STACK_CAPACITY,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::StackConfig;

    #[test]
    fn test_defaults_for_empty_config() {
        let resolved = RuntimeConfig::from_project(&ProjectConfig::default());
        assert_eq!(resolved, RuntimeConfig::default());
        assert!(!resolved.strict_arity);
    }

    #[test]
    fn test_partial_stack_section() {
        let config = ProjectConfig {
            stack: Some(StackConfig {
                initial_capacity: Some(8),
                max_call_depth: None,
            }),
            ..Default::default()
        };
        let resolved = RuntimeConfig::from_project(&config);
        assert_eq!(resolved.stack_capacity, 8);
        assert_eq!(resolved.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
    }
}
