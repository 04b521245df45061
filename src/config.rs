//! Configuration System
//!
//! Layered configuration for logging and the built-in views. Sources, lowest
//! precedence first: built-in defaults, the user-level file, workspace files,
//! then `ADDFS__`-prefixed environment variables (`ADDFS__VIEWS__MAX_HASH_BYTES`).

use crate::error::ApiError;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use crate::logging::LoggingConfig;
pub use crate::views::{ViewKind, ViewsConfig};

mod merge;
mod sources;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddfsConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Built-in view configuration
    #[serde(default)]
    pub views: ViewsConfig,
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Logging(String),
    Views(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
            ValidationError::Views(msg) => write!(f, "Views: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl AddfsConfig {
    /// Validate the entire configuration, collecting every problem found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }
        if let Err(e) = self.views.validate() {
            errors.push(ValidationError::Views(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn to_toml(&self) -> Result<String, ApiError> {
        toml::to_string_pretty(self)
            .map_err(|e| ApiError::ConfigError(format!("Failed to serialize config: {}", e)))
    }
}

/// Loads [`AddfsConfig`] from the layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration for a workspace
    pub fn load(workspace_root: &Path) -> Result<AddfsConfig, ApiError> {
        let builder = merge::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = builder.add_source(
            Environment::with_prefix("ADDFS")
                .separator("__")
                .try_parsing(true),
        );

        let config: AddfsConfig = builder.build()?.try_deserialize()?;
        Self::validated(config)
    }

    /// Load and validate a single configuration file; missing keys take their defaults
    pub fn load_from_file(path: &Path) -> Result<AddfsConfig, ApiError> {
        let config: AddfsConfig = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;
        Self::validated(config)
    }

    /// User-level config file location, if one can be determined
    pub fn global_config_path() -> Option<PathBuf> {
        sources::global_file::global_config_path()
    }

    /// Write the default configuration to `path`, creating parent directories.
    pub fn write_default(path: &Path) -> Result<(), ApiError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ApiError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }
        std::fs::write(path, AddfsConfig::default().to_toml()?)
            .map_err(|e| ApiError::ConfigError(format!("Failed to write {:?}: {}", path, e)))
    }

    fn validated(config: AddfsConfig) -> Result<AddfsConfig, ApiError> {
        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(config)
    }
}
