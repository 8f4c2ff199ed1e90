//! todolist - an ordered todo list kept in SQLite
//!
//! Items carry a 1-based `order`. The store keeps those orders equal to the
//! dense sequence `1..N` across adds, updates and reorders, doing every
//! shift as read-then-write statements inside a single transaction.

pub mod cli;
pub mod domain;
pub mod logging;
pub mod service;
pub mod storage;

pub use domain::{OrderReport, ReorderRequest, TodoItem, TodoItemList, Validator};
pub use service::ItemsService;
pub use storage::{ErrorKind, SqlStore, StoreError, Txn};
