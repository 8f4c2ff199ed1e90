//! Todo item domain model
//!
//! An item is a line of text with a position in the list. Positions
//! (`order`) are 1-based and, across the whole list, form the dense
//! sequence `1..=N`.

use serde::{Deserialize, Serialize};

/// A single entry of the todo list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// UUID string; empty means "generate one on insert"
    #[serde(default)]
    pub id: String,

    /// Item text
    pub item: String,

    /// 1-based position in the list
    pub order: i64,
}

impl TodoItem {
    /// Creates an item without an ID (one is generated when it is added)
    pub fn new(item: impl Into<String>, order: i64) -> Self {
        Self {
            id: String::new(),
            item: item.into(),
            order,
        }
    }

    /// Creates an item with a caller-chosen ID
    pub fn with_id(id: impl Into<String>, item: impl Into<String>, order: i64) -> Self {
        Self {
            id: id.into(),
            item: item.into(),
            order,
        }
    }

    /// Returns true if the ID still has to be generated
    pub fn needs_id(&self) -> bool {
        self.id.is_empty()
    }
}

/// All items plus their count
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItemList {
    pub items: Vec<TodoItem>,
    pub count: usize,
}

impl TodoItemList {
    pub fn push(&mut self, item: TodoItem) {
        self.items.push(item);
        self.count += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// IDs in list order
    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.id.as_str()).collect()
    }
}

/// Request to move an item to a new position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub order: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_json_field_names() {
        let item = TodoItem::with_id("550e8400-e29b-41d4-a716-446655440000", "Buy milk", 1);
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["id"], "550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(json["item"], "Buy milk");
        assert_eq!(json["order"], 1);
    }

    #[test]
    fn missing_id_deserializes_as_empty() {
        let item: TodoItem = serde_json::from_str(r#"{"item": "Walk dog", "order": 2}"#).unwrap();

        assert!(item.needs_id());
        assert_eq!(item.order, 2);
    }

    #[test]
    fn list_push_tracks_count() {
        let mut list = TodoItemList::default();
        assert!(list.is_empty());

        list.push(TodoItem::with_id("a", "first", 1));
        list.push(TodoItem::with_id("b", "second", 2));

        assert_eq!(list.count, 2);
        assert_eq!(list.ids(), vec!["a", "b"]);
    }

    #[test]
    fn empty_list_serializes_with_zero_count() {
        let json = serde_json::to_string(&TodoItemList::default()).unwrap();
        assert_eq!(json, r#"{"items":[],"count":0}"#);
    }
}
