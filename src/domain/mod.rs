//! Domain models for todolist
//!
//! Contains the item records and their validation, without any I/O concerns.

mod item;
mod order_report;
mod validate;

pub use item::{ReorderRequest, TodoItem, TodoItemList};
pub use order_report::OrderReport;
pub use validate::{ValidationError, ValidationRules, Validator, MIN_ORDER};
