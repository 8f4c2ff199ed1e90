//! Main CLI application structure

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use super::item;
use super::output::{Output, OutputFormat};
use crate::logging;
use crate::service::ItemsService;
use crate::storage::{Config, ErrorKind, Project, StoreError};

#[derive(Parser)]
#[command(name = "todolist")]
#[command(author, version, about = "An ordered todo list kept in SQLite")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Database file to use instead of the project's
    #[arg(long, global = true, env = "TODOLIST_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new todolist project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Add an item (appended to the end unless --order is given)
    Add {
        /// Item text
        text: String,

        /// Item ID (a UUID is generated when omitted)
        #[arg(long)]
        id: Option<String>,

        /// Expected order; must be the current maximum plus one
        #[arg(long)]
        order: Option<i64>,
    },

    /// Show one item
    Get {
        /// Item ID
        id: String,
    },

    /// List all items in order
    List,

    /// Replace an item's text and order
    Update {
        /// Item ID
        id: String,

        /// New item text
        text: String,

        /// New order; taking another item's order shifts the items in between
        #[arg(long)]
        order: i64,
    },

    /// Delete an item
    Delete {
        /// Item ID
        id: String,
    },

    /// Move an item to a new position
    Reorder {
        /// Item ID
        id: String,

        /// New 1-based position
        order: i64,
    },

    /// Check that the orders are exactly 1..N
    Verify,

    /// Show the effective configuration
    Config,
}

/// Exit code for a failure of the given kind
pub fn exit_code(kind: Option<ErrorKind>) -> u8 {
    match kind {
        None => 1,
        Some(ErrorKind::Validation) => 3,
        Some(ErrorKind::NotFound) => 4,
        Some(ErrorKind::Conflict) => 5,
        Some(ErrorKind::Constraint) => 6,
        Some(ErrorKind::Transient) => 7,
    }
}

/// Finds the store error behind an application error, if any
fn error_kind(err: &anyhow::Error) -> Option<ErrorKind> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<StoreError>())
        .map(StoreError::kind)
}

/// Main entry point for the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            Output::new(cli.format.unwrap_or_default()).error(&format!("{:#}", e), None);
            return ExitCode::FAILURE;
        }
    };

    logging::init(cli.verbose, &config.global.log_level);

    let format = cli
        .format
        .unwrap_or_else(|| config.global.default_format.into());
    let output = Output::new(format);

    debug!("todolist starting");

    match execute(cli, &config, &output) {
        Ok(()) => {
            debug!("Command completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            let kind = error_kind(&e);
            debug!(kind = ?kind, "Command failed");
            output.error(&format!("{:#}", e), kind);
            ExitCode::from(exit_code(kind))
        }
    }
}

fn execute(cli: Cli, config: &Config, output: &Output) -> Result<()> {
    let db = cli.db.as_deref();

    match cli.command {
        Commands::Init { path } => {
            debug!(path = %path, "Initializing project");
            let project = Project::init(&path)?;
            output.success(&format!(
                "Initialized todolist project at {}",
                project.root().display()
            ));
        }

        Commands::Add { text, id, order } => {
            item::add(output, &mut open_service(db, config)?, &text, id, order)?
        }
        Commands::Get { id } => item::get(output, &mut open_service(db, config)?, &id)?,
        Commands::List => item::list(output, &mut open_service(db, config)?)?,
        Commands::Update { id, text, order } => {
            item::update(output, &mut open_service(db, config)?, &id, &text, order)?
        }
        Commands::Delete { id } => item::delete(output, &mut open_service(db, config)?, &id)?,
        Commands::Reorder { id, order } => {
            item::reorder(output, &mut open_service(db, config)?, &id, order)?
        }
        Commands::Verify => item::verify(output, &mut open_service(db, config)?)?,

        Commands::Config => show_config(output, db, config)?,
    }

    Ok(())
}

/// Opens the item service on `--db` if given, else on the current project
fn open_service(db: Option<&Path>, config: &Config) -> Result<ItemsService> {
    match db {
        Some(path) => {
            debug!(path = %path.display(), "Opening database from --db");
            ItemsService::open(path, &config.project)
                .with_context(|| format!("Failed to open database: {}", path.display()))
        }
        None => Project::open_current()?.service(),
    }
}

fn show_config(output: &Output, db: Option<&Path>, config: &Config) -> Result<()> {
    let database = match db {
        Some(path) => Some(path.to_path_buf()),
        None => config.database_path().ok(),
    };

    if output.is_json() {
        output.data(&serde_json::json!({
            "project_root": config.project_root.as_ref().map(|p| p.display().to_string()),
            "database": database.as_ref().map(|p| p.display().to_string()),
            "project": config.project,
            "global": config.global,
        }));
    } else {
        println!(
            "Project:  {}",
            config
                .project_root
                .as_ref()
                .map_or_else(|| "(none)".to_string(), |p| p.display().to_string())
        );
        println!(
            "Database: {}",
            database.map_or_else(|| "(none)".to_string(), |p| p.display().to_string())
        );
        println!();
        print!(
            "{}",
            toml::to_string_pretty(&config.project).context("Failed to serialize config")?
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn exit_codes_are_distinct() {
        let kinds = [
            None,
            Some(ErrorKind::Validation),
            Some(ErrorKind::NotFound),
            Some(ErrorKind::Conflict),
            Some(ErrorKind::Constraint),
            Some(ErrorKind::Transient),
        ];
        let mut codes: Vec<u8> = kinds.iter().map(|k| exit_code(*k)).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn store_error_kind_survives_context() {
        let err = anyhow::Error::from(StoreError::NotFound("x".to_string()))
            .context("Failed to get item");
        assert_eq!(error_kind(&err), Some(ErrorKind::NotFound));

        let plain = anyhow::anyhow!("something else");
        assert_eq!(error_kind(&plain), None);
    }
}
