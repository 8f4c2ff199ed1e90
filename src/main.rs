//! todolist - an ordered todo list kept in SQLite

use std::process::ExitCode;

fn main() -> ExitCode {
    todolist::cli::run()
}
