//! Configuration handling for todolist
//!
//! Configuration is stored in `.todolist/config.toml` (project) and
//! `~/.config/todolist/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::sql_store::OrderingPolicy;
use crate::domain::ValidationRules;

/// Name of the per-project directory
pub const PROJECT_DIR: &str = ".todolist";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Database location and connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file, relative to `.todolist/` unless absolute
    pub file: PathBuf,

    /// How long a transaction waits for another writer, in milliseconds
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("todolist.db"),
            busy_timeout_ms: 5000,
        }
    }
}

impl DatabaseConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ProjectConfig {
    pub database: DatabaseConfig,

    /// Ordering policy for first inserts and deletes
    pub ordering: OrderingPolicy,

    /// Input validation rules
    pub validation: ValidationRules,
}

impl ProjectConfig {
    /// Rejects values that parse but make no sense
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.file must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,

    /// Log level used when neither RUST_LOG nor --verbose is set
    pub log_level: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            default_format: OutputFormat::Text,
            log_level: "warn".to_string(),
        }
    }
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from default locations
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let (project, project_root) = Self::load_project()?;

        Ok(Self {
            project,
            global,
            project_root,
        })
    }

    /// Loads configuration for a specific project
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project_config(project_root)?;

        Ok(Self {
            project,
            global,
            project_root: Some(project_root.to_path_buf()),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "todolist", "todolist").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Finds and loads project configuration
    fn load_project() -> Result<(ProjectConfig, Option<PathBuf>)> {
        match Self::find_project_root() {
            Some(root) => {
                let config = Self::load_project_config(&root)?;
                Ok((config, Some(root)))
            }
            None => Ok((ProjectConfig::default(), None)),
        }
    }

    /// Loads project configuration from a specific root
    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(PROJECT_DIR).join("config.toml");

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")?;

        config.validate()?;
        Ok(config)
    }

    /// Finds the project root by looking for a `.todolist/` directory
    pub fn find_project_root() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Returns the project root, or an error if not in a project
    pub fn require_project_root(&self) -> Result<&Path> {
        self.project_root
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Not in a todolist project. Run 'todolist init' first."))
    }

    /// Resolves the database file against the project directory
    pub fn database_path(&self) -> Result<PathBuf> {
        let file = &self.project.database.file;
        if file.is_absolute() {
            return Ok(file.clone());
        }

        Ok(self.require_project_root()?.join(PROJECT_DIR).join(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = Config {
            project: ProjectConfig::default(),
            global: GlobalConfig::default(),
            project_root: None,
        };

        assert_eq!(config.project.database.file, PathBuf::from("todolist.db"));
        assert!(config.project.ordering.strict_first_order);
        assert!(!config.project.ordering.close_gaps_on_delete);
        assert_eq!(config.global.default_format, OutputFormat::Text);
        assert_eq!(config.global.log_level, "warn");
    }

    #[test]
    fn parse_project_config() {
        let toml = r#"
[database]
file = "items.sqlite"
busy_timeout_ms = 250

[ordering]
close_gaps_on_delete = true

[validation]
require_uuid_v4 = true
max_text_len = 80
"#;

        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.database.file, PathBuf::from("items.sqlite"));
        assert_eq!(config.database.busy_timeout(), Duration::from_millis(250));
        assert!(config.ordering.close_gaps_on_delete);
        // Unset keys keep their defaults
        assert!(config.ordering.strict_first_order);
        assert!(config.validation.require_uuid_v4);
        assert_eq!(config.validation.max_text_len, 80);
    }

    #[test]
    fn parse_global_config() {
        let toml = r#"
default_format = "json"
log_level = "debug"
"#;

        let config: GlobalConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.default_format, OutputFormat::Json);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn empty_database_file_is_invalid() {
        let config: ProjectConfig = toml::from_str("[database]\nfile = \"\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn database_path_resolution() {
        let dir = TempDir::new().unwrap();
        let mut config = Config {
            project: ProjectConfig::default(),
            global: GlobalConfig::default(),
            project_root: Some(dir.path().to_path_buf()),
        };

        assert_eq!(
            config.database_path().unwrap(),
            dir.path().join(".todolist").join("todolist.db")
        );

        let absolute = dir.path().join("elsewhere.db");
        config.project.database.file = absolute.clone();
        assert_eq!(config.database_path().unwrap(), absolute);
    }

    #[test]
    fn config_not_in_project() {
        let config = Config {
            project: ProjectConfig::default(),
            global: GlobalConfig::default(),
            project_root: None,
        };

        assert!(config.require_project_root().is_err());
        assert!(config.database_path().is_err());
    }
}
