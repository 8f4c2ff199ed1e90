//! Input validation for items and reorder requests
//!
//! The [`Validator`] is built from a [`ValidationRules`] value and handed to
//! whoever needs it, so tests can run with different rule sets side by side.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::item::{ReorderRequest, TodoItem};

/// Lowest valid position in the list
pub const MIN_ORDER: i64 = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid item ID: expected a UUID or nothing, got '{0}'")]
    InvalidId(String),

    #[error("Invalid item ID: expected a version 4 UUID, got '{0}'")]
    NotUuidV4(String),

    #[error("Item text is required")]
    EmptyText,

    #[error("Item text is too long: {len} characters (max {max})")]
    TextTooLong { len: usize, max: usize },

    #[error("Order must be at least 1, got {0}")]
    OrderTooLow(i64),
}

/// Tunable validation rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    /// Reject UUIDs of any version other than 4
    pub require_uuid_v4: bool,

    /// Maximum item text length in characters (0 = unlimited)
    pub max_text_len: usize,
}

/// Validates records before they reach the store
#[derive(Debug, Clone, Default)]
pub struct Validator {
    rules: ValidationRules,
}

impl Validator {
    pub fn new(rules: ValidationRules) -> Self {
        Self { rules }
    }

    /// Validates a full item record
    pub fn validate_item(&self, item: &TodoItem) -> Result<(), ValidationError> {
        self.validate_id(&item.id)?;
        self.validate_text(&item.item)?;
        Self::validate_order(item.order)
    }

    /// Validates a reorder request
    pub fn validate_reorder(&self, request: &ReorderRequest) -> Result<(), ValidationError> {
        Self::validate_order(request.order)
    }

    /// Accepts an empty ID or a parseable UUID
    pub fn validate_id(&self, id: &str) -> Result<(), ValidationError> {
        if id.is_empty() {
            return Ok(());
        }

        let uuid = Uuid::parse_str(id).map_err(|_| ValidationError::InvalidId(id.to_string()))?;

        if self.rules.require_uuid_v4 && uuid.get_version_num() != 4 {
            return Err(ValidationError::NotUuidV4(id.to_string()));
        }

        Ok(())
    }

    fn validate_text(&self, text: &str) -> Result<(), ValidationError> {
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }

        let len = text.chars().count();
        if self.rules.max_text_len > 0 && len > self.rules.max_text_len {
            return Err(ValidationError::TextTooLong {
                len,
                max: self.rules.max_text_len,
            });
        }

        Ok(())
    }

    fn validate_order(order: i64) -> Result<(), ValidationError> {
        if order < MIN_ORDER {
            return Err(ValidationError::OrderTooLow(order));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V4: &str = "550e8400-e29b-41d4-a716-446655440000";
    const V1: &str = "c232ab00-9414-11ec-b3c8-9e6bdeced846";

    #[test]
    fn id_rules() {
        let cases = [
            ("valid uuid", V4, true),
            ("empty id", "", true),
            ("invalid uuid", "invalid-uuid", false),
        ];

        let validator = Validator::default();
        for (name, id, ok) in cases {
            assert_eq!(validator.validate_id(id).is_ok(), ok, "{}", name);
        }
    }

    #[test]
    fn v4_only_rule() {
        let lenient = Validator::default();
        let strict = Validator::new(ValidationRules {
            require_uuid_v4: true,
            ..Default::default()
        });

        assert!(lenient.validate_id(V1).is_ok());
        assert_eq!(
            strict.validate_id(V1),
            Err(ValidationError::NotUuidV4(V1.to_string()))
        );
        assert!(strict.validate_id(V4).is_ok());
    }

    #[test]
    fn text_is_required() {
        let validator = Validator::default();

        assert_eq!(
            validator.validate_item(&TodoItem::new("", 1)),
            Err(ValidationError::EmptyText)
        );
        assert_eq!(
            validator.validate_item(&TodoItem::new("   ", 1)),
            Err(ValidationError::EmptyText)
        );
    }

    #[test]
    fn text_length_limit() {
        let validator = Validator::new(ValidationRules {
            max_text_len: 5,
            ..Default::default()
        });

        assert!(validator.validate_item(&TodoItem::new("short", 1)).is_ok());
        assert_eq!(
            validator.validate_item(&TodoItem::new("too long", 1)),
            Err(ValidationError::TextTooLong { len: 8, max: 5 })
        );
    }

    #[test]
    fn order_must_be_positive() {
        let validator = Validator::default();

        assert_eq!(
            validator.validate_item(&TodoItem::new("x", 0)),
            Err(ValidationError::OrderTooLow(0))
        );
        assert_eq!(
            validator.validate_reorder(&ReorderRequest { order: -3 }),
            Err(ValidationError::OrderTooLow(-3))
        );
        assert!(validator.validate_reorder(&ReorderRequest { order: 1 }).is_ok());
    }
}
