#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for morphsweep
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/morphsweep/config.toml)
//! - Environment variables
//! - CLI flags (applied by the binary)
//!
//! Besides connection settings, the file declares the entities and their
//! polymorphic relations so sweeps can run without compiled models.

pub mod core;

pub use crate::core::{DatabaseConfig, GeneralConfig};

use morphsweep_errors::{ConfigError, Error};
use morphsweep_types::{ColorChoice, EntityDefinition};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub entities: Vec<EntityDefinition>,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("morphsweep").join("config.toml"))
    }

    /// Parse configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns an error if the contents are not valid TOML for this schema.
    pub fn from_toml(contents: &str) -> Result<Self, Error> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        Self::from_toml(&contents)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: &Option<PathBuf>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // MORPHSWEEP_DATABASE_URL
        if let Ok(url) = std::env::var("MORPHSWEEP_DATABASE_URL") {
            self.database.url = Some(url);
        }

        // MORPHSWEEP_DRY_RUN
        if let Ok(dry_run) = std::env::var("MORPHSWEEP_DRY_RUN") {
            self.general.dry_run = match dry_run.as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "MORPHSWEEP_DRY_RUN".to_string(),
                        value: dry_run,
                    }
                    .into())
                }
            };
        }

        // MORPHSWEEP_COLOR
        if let Ok(color) = std::env::var("MORPHSWEEP_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "MORPHSWEEP_COLOR".to_string(),
                        value: color,
                    }
                    .into())
                }
            };
        }

        Ok(())
    }

    /// Check the entity declarations for consistency
    ///
    /// Returns warnings for declarations that are legal but have no effect,
    /// such as a cascade accessor that resolves to a non-morph relation.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate labels or on cascade accessors that are
    /// not declared under the entity's relations.
    pub fn validate(&self) -> Result<Vec<String>, Error> {
        let mut seen = HashSet::new();
        let mut warnings = Vec::new();

        for entity in &self.entities {
            if !seen.insert(entity.label.as_str()) {
                return Err(ConfigError::Invalid {
                    message: format!("entity `{}` is declared more than once", entity.label),
                }
                .into());
            }
            if entity.table.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: format!("entities.{}.table", entity.label),
                }
                .into());
            }

            for accessor in &entity.cascade_delete_morph {
                match entity.relations.get(accessor) {
                    None => {
                        return Err(ConfigError::UndeclaredAccessor {
                            entity: entity.label.clone(),
                            accessor: accessor.clone(),
                        }
                        .into())
                    }
                    Some(relation) if !relation.is_morphic() => warnings.push(format!(
                        "{}: accessor `{accessor}` is not a morph relation and will be ignored",
                        entity.label
                    )),
                    Some(_) => {}
                }
            }

            if entity.cascade && entity.cascade_delete_morph.is_empty() {
                warnings.push(format!(
                    "{}: cascade is enabled but no accessors are listed",
                    entity.label
                ));
            }
        }

        Ok(warnings)
    }

    /// Get the database URL
    ///
    /// # Errors
    ///
    /// Returns an error if no URL was configured anywhere.
    pub fn database_url(&self) -> Result<&str, Error> {
        self.database.url.as_deref().ok_or_else(|| {
            ConfigError::MissingField {
                field: "database.url".to_string(),
            }
            .into()
        })
    }

    /// Whether sweeps should only count
    #[must_use]
    pub fn dry_run(&self) -> bool {
        self.general.dry_run
    }
}
