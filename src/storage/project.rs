//! Project management
//!
//! Handles project initialization and opens the item store.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::PROJECT_DIR;
use super::Config;
use crate::service::ItemsService;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a todolist project. Run 'todolist init' first.")]
    NotInProject,
}

/// A todolist project: a directory holding `.todolist/`
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(PROJECT_DIR).is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let project_dir = root.join(PROJECT_DIR);

        fs::create_dir_all(&project_dir).with_context(|| {
            format!("Failed to create {} directory: {}", PROJECT_DIR, project_dir.display())
        })?;

        // Create default config
        let config_path = project_dir.join("config.toml");
        if !config_path.exists() {
            let default_config = r#"# todolist configuration

[database]
# Database file, relative to this directory
file = "todolist.db"
busy_timeout_ms = 5000

[ordering]
# The first item of an empty list must have order 1
strict_first_order = true
# Shift later items down when an item is deleted
close_gaps_on_delete = false

[validation]
require_uuid_v4 = false
# 0 = unlimited
max_text_len = 0
"#;
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        // Keep the database out of version control
        let gitignore_path = project_dir.join(".gitignore");
        if !gitignore_path.exists() {
            let gitignore = "*.db\n*.db-wal\n*.db-shm\n";
            fs::write(&gitignore_path, gitignore).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        let project = Self::open(root)?;

        // Creating the service creates the database and its schema
        project.service()?;

        Ok(project)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .todolist directory path
    pub fn project_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the database file path
    pub fn database_path(&self) -> Result<PathBuf> {
        self.config.database_path()
    }

    /// Opens a fresh connection to the project's database
    pub fn service(&self) -> Result<ItemsService> {
        let path = self.database_path()?;
        ItemsService::open(&path, &self.config.project)
            .with_context(|| format!("Failed to open database: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_creates_structure() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.project_dir().is_dir());
        assert!(project.project_dir().join("config.toml").is_file());
        assert!(project.project_dir().join(".gitignore").is_file());
        assert!(project.project_dir().join("todolist.db").is_file());
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();

        Project::init(dir.path()).unwrap();
        Project::init(dir.path()).unwrap(); // Should not fail

        assert!(dir.path().join(PROJECT_DIR).is_dir());
    }

    #[test]
    fn default_config_file_parses() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.config().project.ordering.strict_first_order);
        assert_eq!(project.config().project.database.busy_timeout_ms, 5000);
    }

    #[test]
    fn open_existing_project() {
        let dir = TempDir::new().unwrap();
        Project::init(dir.path()).unwrap();

        let project = Project::open(dir.path()).unwrap();
        assert_eq!(project.root(), dir.path());
    }

    #[test]
    fn open_non_project_fails() {
        let dir = TempDir::new().unwrap();
        let result = Project::open(dir.path());

        assert!(result.is_err());
    }

    #[test]
    fn service_uses_project_policy() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();
        let config_path = project.project_dir().join("config.toml");
        let content = fs::read_to_string(&config_path).unwrap();
        fs::write(
            &config_path,
            content.replace("close_gaps_on_delete = false", "close_gaps_on_delete = true"),
        )
        .unwrap();

        let project = Project::open(dir.path()).unwrap();
        let service = project.service().unwrap();

        assert!(service.store().policy().close_gaps_on_delete);
        assert_eq!(service.store().path(), Some(project.database_path().unwrap().as_path()));
    }

    #[test]
    fn service_connections_share_data() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        let mut writer = project.service().unwrap();
        writer.append_item("from one connection").unwrap();

        let mut reader = project.service().unwrap();
        assert_eq!(reader.list_items().unwrap().count, 1);
    }
}
