//! Items service
//!
//! Validates input with an injected [`Validator`] and runs each operation
//! as exactly one store transaction.

use std::path::Path;

use tracing::debug;

use crate::domain::{OrderReport, ReorderRequest, TodoItem, TodoItemList, Validator};
use crate::storage::{ProjectConfig, SqlStore, StoreError};

pub struct ItemsService {
    store: SqlStore,
    validator: Validator,
}

impl ItemsService {
    pub fn new(store: SqlStore, validator: Validator) -> Self {
        Self { store, validator }
    }

    /// Opens the database at `path` with the project's policy and rules
    pub fn open(path: &Path, config: &ProjectConfig) -> Result<Self, StoreError> {
        let store = SqlStore::open(path)?.with_policy(config.ordering);
        store.set_busy_timeout(config.database.busy_timeout())?;

        Ok(Self::new(store, Validator::new(config.validation.clone())))
    }

    pub fn store(&self) -> &SqlStore {
        &self.store
    }

    /// Adds an item at the caller-given order; returns it with its final ID
    pub fn add_item(&mut self, mut item: TodoItem) -> Result<TodoItem, StoreError> {
        self.validator.validate_item(&item)?;

        self.store.update(|tx| tx.add(&mut item))?;
        debug!(id = %item.id, order = item.order, "Item added");

        Ok(item)
    }

    /// Adds an item at the end of the list
    pub fn append_item(&mut self, text: &str) -> Result<TodoItem, StoreError> {
        self.append_item_with_id(String::new(), text)
    }

    /// Adds an item with a chosen ID at the end of the list
    pub fn append_item_with_id(&mut self, id: String, text: &str) -> Result<TodoItem, StoreError> {
        let mut item = TodoItem::with_id(id, text, 1);
        self.validator.validate_item(&item)?;

        self.store.update(|tx| {
            item.order = tx.next_order()?;
            tx.add(&mut item)
        })?;
        debug!(id = %item.id, order = item.order, "Item appended");

        Ok(item)
    }

    pub fn get_item(&mut self, id: &str) -> Result<TodoItem, StoreError> {
        self.store.update(|tx| tx.get(id))
    }

    pub fn list_items(&mut self) -> Result<TodoItemList, StoreError> {
        self.store.update(|tx| tx.list())
    }

    /// Replaces the item's text and order; the ID comes from `id`, not the body
    pub fn update_item(&mut self, id: &str, mut item: TodoItem) -> Result<TodoItem, StoreError> {
        item.id = id.to_string();
        self.validator.validate_item(&item)?;

        self.store.update(|tx| tx.update(&item))?;
        debug!(id, order = item.order, "Item updated");

        Ok(item)
    }

    pub fn delete_item(&mut self, id: &str) -> Result<(), StoreError> {
        self.store.update(|tx| tx.delete(id))?;
        debug!(id, "Item deleted");
        Ok(())
    }

    /// Moves an item and returns it at its new position
    pub fn reorder_item(&mut self, id: &str, request: ReorderRequest) -> Result<TodoItem, StoreError> {
        self.validator.validate_reorder(&request)?;

        let item = self.store.update(|tx| {
            tx.reorder(id, request.order)?;
            tx.get(id)
        })?;
        debug!(id, order = item.order, "Item reordered");

        Ok(item)
    }

    /// Reports gaps and duplicates in the current ordering
    pub fn verify(&mut self) -> Result<OrderReport, StoreError> {
        self.store.update(|tx| tx.order_report())
    }
}
