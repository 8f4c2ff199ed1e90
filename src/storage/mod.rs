//! # Storage Layer
//!
//! Persistence for todolist: a single SQLite table plus TOML configuration.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Items | SQLite table `todolist (id, item, "order")` | `.todolist/todolist.db` |
//! | Config | TOML | `.todolist/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - Every operation is one transaction opened with `BEGIN IMMEDIATE`
//! - Writers on other connections wait up to `database.busy_timeout_ms`
//! - Nothing is retried; a failed statement rolls back the whole operation
//!
//! ## Project Structure
//!
//! ```text
//! .todolist/
//! ├── todolist.db       # Item table
//! ├── config.toml       # Project configuration
//! └── .gitignore        # Ignores the database files
//! ```
//!
//! ## Key Types
//!
//! - [`SqlStore`] - Unit of work over the item table
//! - [`Txn`] - Ordering-aware operations inside one transaction
//! - [`Project`] - Entry point for a todolist project
//! - [`Config`] - Project and global configuration

mod config;
mod project;
mod sql_store;

pub use config::{Config, ConfigError, DatabaseConfig, GlobalConfig, OutputFormat, ProjectConfig, PROJECT_DIR};
pub use project::{Project, ProjectError};
pub use sql_store::{ErrorKind, OrderingPolicy, SqlStore, StoreError, Txn};
