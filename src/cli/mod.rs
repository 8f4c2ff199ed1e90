//! # Command-Line Interface
//!
//! User-facing commands over the ordered item store.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `init` | Create `.todolist/` with config and database |
//! | `add`, `get`, `list`, `update`, `delete` | Item lifecycle |
//! | `reorder` | Move an item, shifting the items in between |
//! | `verify` | Check that orders are exactly `1..N` |
//! | `config` | Show the effective configuration |
//!
//! ## Output Formats
//!
//! All commands support the `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON; errors carry a `kind` field
//!
//! ## Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | Other failure |
//! | 3 | Validation error |
//! | 4 | Unknown item ID |
//! | 5 | Order conflict |
//! | 6 | Duplicate item ID |
//! | 7 | Database failure |
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod item;
mod output;

pub use app::{exit_code, run, Cli, Commands};
pub use output::{Output, OutputFormat};
