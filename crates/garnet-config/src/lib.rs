//! Runtime settings for the Garnet VM
//!
//! Settings come from up to three layers, each overriding the one before:
//! 1. `~/.garnet/config.toml`, shared by every project of the user
//! 2. `garnet.toml`, found by walking up from the working directory
//! 3. `GARNET_STRICT_ARITY` and `GARNET_MAX_CALL_DEPTH`
//!
//! The merged layers resolve to a [`RuntimeConfig`] with every default filled in.
//!
//! ```no_run
//! use garnet_config::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::new().load_from_directory(Path::new(".")).unwrap();
//! let runtime = config.runtime();
//! println!("strict arity: {}", runtime.strict_arity);
//! ```

pub mod loader;
pub mod project;
pub mod runtime;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no config file at {0}")]
    NotFound(PathBuf),

    #[error("cannot read config: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("cannot locate the home directory")]
    HomeNotFound,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

pub use loader::{Config, ConfigLoader};
pub use project::ProjectConfig;
pub use runtime::RuntimeConfig;
