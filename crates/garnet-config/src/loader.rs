//! Config discovery and layering

use crate::project::ProjectConfig;
use crate::runtime::RuntimeConfig;
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// Name of the project configuration file
pub const PROJECT_CONFIG_FILE: &str = "garnet.toml";

/// Reads the user file, then the project file over it, then the environment
pub struct ConfigLoader {
    user_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone)]
pub struct Config {
    /// Effective file configuration after merging and env overrides
    pub project: ProjectConfig,

    /// Project root directory (where garnet.toml was found)
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            user_config_path: None,
        }
    }

    /// Create a loader that reads user-level settings from `path`
    /// instead of ~/.garnet/config.toml
    pub fn with_user_config(path: impl Into<PathBuf>) -> Self {
        Self {
            user_config_path: Some(path.into()),
        }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find garnet.toml, then merges it over
    /// the user config if one exists.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project_config) = self.find_project_config(start_dir)?;
        self.finish(project_root, project_config)
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let project_config = ProjectConfig::load_from_file(config_path)?;
        let project_root = config_path.parent().map(|p| p.to_path_buf());
        self.finish(project_root, project_config)
    }

    fn finish(
        &mut self,
        project_root: Option<PathBuf>,
        project_config: ProjectConfig,
    ) -> ConfigResult<Config> {
        let mut merged = self.load_user_config()?;
        merged.merge(&project_config);
        let merged = apply_env_overrides(merged)?;

        Ok(Config {
            project: merged,
            project_root,
        })
    }

    /// Nearest garnet.toml at or above `start_dir`
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(PROJECT_CONFIG_FILE);

            if config_path.exists() {
                let project_config = ProjectConfig::load_from_file(&config_path)?;
                return Ok((Some(current), project_config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, ProjectConfig::default())),
            }
        }
    }

    /// Load user configuration; a missing file or home directory yields defaults
    fn load_user_config(&mut self) -> ConfigResult<ProjectConfig> {
        let path = match &self.user_config_path {
            Some(path) => path.clone(),
            None => match Self::user_config_path() {
                Ok(path) => {
                    self.user_config_path = Some(path.clone());
                    path
                }
                Err(ConfigError::HomeNotFound) => return Ok(ProjectConfig::default()),
                Err(e) => return Err(e),
            },
        };

        if !path.exists() {
            return Ok(ProjectConfig::default());
        }

        ProjectConfig::load_from_file(&path)
    }

    /// Get the user config file path (~/.garnet/config.toml)
    pub fn user_config_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".garnet").join("config.toml"))
    }
}

/// Apply environment variable overrides
///
/// - GARNET_STRICT_ARITY=true|1|yes
/// - GARNET_MAX_CALL_DEPTH=<positive integer>
fn apply_env_overrides(mut config: ProjectConfig) -> ConfigResult<ProjectConfig> {
    if let Ok(strict) = env::var("GARNET_STRICT_ARITY") {
        let strict_bool = matches!(strict.to_lowercase().as_str(), "true" | "1" | "yes");
        config
            .binding
            .get_or_insert_with(Default::default)
            .strict_arity = Some(strict_bool);
    }

    if let Ok(depth) = env::var("GARNET_MAX_CALL_DEPTH") {
        let parsed = depth
            .trim()
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidValue {
                field: "GARNET_MAX_CALL_DEPTH".to_string(),
                reason: format!("'{}' is not a valid depth: {}", depth, e),
            })?;
        config.stack.get_or_insert_with(Default::default).max_call_depth = Some(parsed);
    }

    config.validate()?;
    Ok(config)
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Resolved settings for constructing a VM
    pub fn runtime(&self) -> RuntimeConfig {
        RuntimeConfig::from_project(&self.project)
    }

    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Whether a garnet.toml was found
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn create_config_file(dir: &Path, content: &str) -> PathBuf {
        let config_path = dir.join(PROJECT_CONFIG_FILE);
        fs::write(&config_path, content).unwrap();
        config_path
    }

    fn isolated_loader(dir: &TempDir) -> ConfigLoader {
        ConfigLoader::with_user_config(dir.path().join("no-user-config.toml"))
    }

    #[test]
    #[serial]
    fn test_find_config_in_parent() {
        let temp_dir = TempDir::new().unwrap();
        create_config_file(temp_dir.path(), "[binding]\nstrict_arity = true\n");

        let sub_dir = temp_dir.path().join("subdir");
        fs::create_dir(&sub_dir).unwrap();

        let mut loader = isolated_loader(&temp_dir);
        let config = loader.load_from_directory(&sub_dir).unwrap();

        assert!(config.runtime().strict_arity);
        assert_eq!(config.project_root(), Some(temp_dir.path()));
    }

    #[test]
    #[serial]
    fn test_invalid_depth_env_rejected() {
        let temp_dir = TempDir::new().unwrap();
        env::set_var("GARNET_MAX_CALL_DEPTH", "deep");

        let mut loader = isolated_loader(&temp_dir);
        let result = loader.load_from_directory(temp_dir.path());

        env::remove_var("GARNET_MAX_CALL_DEPTH");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
