//! SQLite ordering store
//!
//! Items live in a single `todolist` table. Every operation runs inside a
//! unit of work opened by [`SqlStore::update`], and every mutation keeps the
//! `order` column equal to the dense sequence `1..=N`, with two documented
//! exceptions: a bare delete leaves a gap unless
//! [`OrderingPolicy::close_gaps_on_delete`] is set, and an update or reorder
//! to a position past the end of the list lands there as-is.
//!
//! Shifts are done row by row: the affected range is read first, then each
//! row is written back with its own previous order plus or minus one.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{ffi, params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{OrderReport, TodoItem, TodoItemList, ValidationError, MIN_ORDER};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Unknown ID {0}")]
    NotFound(String),

    #[error("Order should be {expected}, got {got}")]
    OrderMismatch { expected: i64, got: i64 },

    #[error("No items were reordered")]
    NothingReordered,

    #[error("No order follows {0}")]
    OrderOverflow(i64),

    #[error("An item with ID {0} already exists")]
    DuplicateId(String),

    #[error("Database schema version {found} is newer than supported version {supported}")]
    SchemaTooNew { found: i32, supported: i32 },

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// Broad failure category, used to pick exit codes and error payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input, rejected before touching the table
    Validation,
    /// Unknown item ID
    NotFound,
    /// Wrong append order, or a reorder that moved nothing
    Conflict,
    /// Duplicate item ID
    Constraint,
    /// Any database or connection fault
    Transient,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Constraint => "constraint",
            ErrorKind::Transient => "transient",
        }
    }
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Invalid(_) => ErrorKind::Validation,
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::OrderMismatch { .. }
            | StoreError::NothingReordered
            | StoreError::OrderOverflow(_) => ErrorKind::Conflict,
            StoreError::DuplicateId(_) => ErrorKind::Constraint,
            StoreError::SchemaTooNew { .. } | StoreError::Sqlite(_) => ErrorKind::Transient,
        }
    }
}

/// Knobs for the two places where the dense-order rule is a policy choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderingPolicy {
    /// Require the first item of an empty list to have order 1
    pub strict_first_order: bool,

    /// Shift later items down when an item is deleted
    pub close_gaps_on_delete: bool,
}

impl Default for OrderingPolicy {
    fn default() -> Self {
        Self {
            strict_first_order: true,
            close_gaps_on_delete: false,
        }
    }
}

/// Transactional store for ordered todo items
pub struct SqlStore {
    /// Path to the database file (`None` for in-memory databases)
    db_path: Option<PathBuf>,

    conn: Connection,

    policy: OrderingPolicy,
}

impl SqlStore {
    /// Schema version - bump when the table layout changes
    const SCHEMA_VERSION: i32 = 1;

    /// Default wait for another connection's write lock
    pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

    /// Opens (or creates) the database at the given path
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        Self::init(conn, Some(path.to_path_buf()))
    }

    /// Creates a private in-memory database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, db_path: Option<PathBuf>) -> Result<Self, StoreError> {
        conn.busy_timeout(Self::DEFAULT_BUSY_TIMEOUT)?;

        let store = Self {
            db_path,
            conn,
            policy: OrderingPolicy::default(),
        };
        store.ensure_schema()?;

        Ok(store)
    }

    /// Replaces the ordering policy
    pub fn with_policy(mut self, policy: OrderingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets how long a transaction waits for another connection's lock
    pub fn set_busy_timeout(&self, timeout: Duration) -> Result<(), StoreError> {
        self.conn.busy_timeout(timeout)?;
        Ok(())
    }

    pub fn policy(&self) -> OrderingPolicy {
        self.policy
    }

    /// Returns the path to the database file
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn ensure_schema(&self) -> Result<(), StoreError> {
        let version = self.schema_version()?;

        if version > Self::SCHEMA_VERSION {
            return Err(StoreError::SchemaTooNew {
                found: version,
                supported: Self::SCHEMA_VERSION,
            });
        }

        if version < Self::SCHEMA_VERSION {
            self.conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS todolist (
                    id TEXT PRIMARY KEY,
                    item TEXT NOT NULL,
                    "order" INTEGER NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_todolist_order ON todolist("order");
                "#,
            )?;

            self.conn
                .execute_batch(&format!("PRAGMA user_version = {}", Self::SCHEMA_VERSION))?;
        }

        Ok(())
    }

    fn schema_version(&self) -> Result<i32, StoreError> {
        let version = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;
        Ok(version)
    }

    /// Runs `action` inside one transaction.
    ///
    /// Commits if `action` returns `Ok` and hands its value back. If it
    /// returns `Err`, the transaction is rolled back and the same error is
    /// returned. If it panics, dropping the transaction during unwinding
    /// rolls it back and the panic continues.
    ///
    /// The transaction starts with `BEGIN IMMEDIATE`, so writers on other
    /// connections queue on the database lock (up to the busy timeout)
    /// instead of interleaving their read-then-write sequences.
    pub fn update<T, F>(&mut self, action: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Txn<'_>) -> Result<T, StoreError>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let txn = Txn {
            tx,
            policy: self.policy,
        };

        match action(&txn) {
            Ok(value) => {
                txn.tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                debug!(error = %err, "Transaction rollback due to error");
                if let Err(rollback_err) = txn.tx.rollback() {
                    debug!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }
}

/// Handle to an open transaction, passed to [`SqlStore::update`] callbacks
pub struct Txn<'conn> {
    tx: Transaction<'conn>,
    policy: OrderingPolicy,
}

fn read_item(row: &Row<'_>) -> rusqlite::Result<TodoItem> {
    Ok(TodoItem {
        id: row.get(0)?,
        item: row.get(1)?,
        order: row.get(2)?,
    })
}

/// `order + delta`, failing instead of wrapping past `i64::MAX`
fn offset(order: i64, delta: i64) -> Result<i64, StoreError> {
    order
        .checked_add(delta)
        .ok_or(StoreError::OrderOverflow(order))
}

fn is_primary_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

impl Txn<'_> {
    /// Fails with [`StoreError::NotFound`] unless an item with `id` exists
    pub fn check_id(&self, id: &str) -> Result<(), StoreError> {
        let existing: Option<String> = self
            .tx
            .query_row(
                "SELECT id FROM todolist WHERE id = ?1 LIMIT 1",
                params![id],
                |row| row.get(0),
            )
            .optional()
            .inspect_err(|e| debug!(error = %e, "Failed to check existing ID"))?;

        match existing {
            Some(_) => Ok(()),
            None => {
                debug!(id, "ID does not exist");
                Err(StoreError::NotFound(id.to_string()))
            }
        }
    }

    /// Number of items
    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .tx
            .query_row("SELECT COUNT(*) FROM todolist", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Highest order in the table, `None` when the table is empty
    pub fn max_order(&self) -> Result<Option<i64>, StoreError> {
        let max = self
            .tx
            .query_row(r#"SELECT MAX("order") FROM todolist"#, [], |row| row.get(0))
            .inspect_err(|e| debug!(error = %e, "Failed to get the max order"))?;
        Ok(max)
    }

    /// The only order a new item may take
    pub fn next_order(&self) -> Result<i64, StoreError> {
        match self.max_order()? {
            Some(max) => offset(max, 1),
            None => Ok(MIN_ORDER),
        }
    }

    fn order_taken_by_other(&self, order: i64, id: &str) -> Result<bool, StoreError> {
        let taken = self
            .tx
            .query_row(
                r#"SELECT 1 FROM todolist WHERE "order" = ?1 AND id != ?2 LIMIT 1"#,
                params![order, id],
                |_| Ok(()),
            )
            .optional()
            .inspect_err(|e| debug!(error = %e, "Failed to check existing order"))?;
        Ok(taken.is_some())
    }

    fn current_order(&self, id: &str) -> Result<Option<i64>, StoreError> {
        let order = self
            .tx
            .query_row(
                r#"SELECT "order" FROM todolist WHERE id = ?1"#,
                params![id],
                |row| row.get(0),
            )
            .optional()
            .inspect_err(|e| debug!(error = %e, id, "Failed to get the current order of the item"))?;
        Ok(order)
    }

    /// Appends an item.
    ///
    /// Generates an ID if `item.id` is empty and writes it back into `item`.
    /// On a non-empty table `item.order` must be the current maximum plus one.
    pub fn add(&self, item: &mut TodoItem) -> Result<(), StoreError> {
        if item.needs_id() {
            item.id = Uuid::new_v4().to_string();
        }

        let expected = match self.max_order()? {
            Some(max) => Some(offset(max, 1)?),
            None if self.policy.strict_first_order => Some(MIN_ORDER),
            None => None,
        };

        if let Some(expected) = expected.filter(|&expected| expected != item.order) {
            return Err(StoreError::OrderMismatch {
                expected,
                got: item.order,
            });
        }

        self.tx
            .execute(
                r#"INSERT INTO todolist (id, item, "order") VALUES (?1, ?2, ?3)"#,
                params![item.id, item.item, item.order],
            )
            .map_err(|e| {
                debug!(error = %e, id = %item.id, "Failed to add item");
                if is_primary_key_violation(&e) {
                    StoreError::DuplicateId(item.id.clone())
                } else {
                    StoreError::Sqlite(e)
                }
            })?;

        Ok(())
    }

    /// Looks up one item
    pub fn get(&self, id: &str) -> Result<TodoItem, StoreError> {
        self.tx
            .query_row(
                r#"SELECT id, item, "order" FROM todolist WHERE id = ?1"#,
                params![id],
                read_item,
            )
            .optional()
            .inspect_err(|e| debug!(error = %e, id, "Failed to get item"))?
            .ok_or_else(|| {
                debug!(id, "Unknown ID");
                StoreError::NotFound(id.to_string())
            })
    }

    /// All items, sorted by order
    pub fn list(&self) -> Result<TodoItemList, StoreError> {
        let mut stmt = self
            .tx
            .prepare(r#"SELECT id, item, "order" FROM todolist ORDER BY "order", id"#)?;

        let mut list = TodoItemList::default();
        for item in stmt.query_map([], read_item)? {
            list.push(item.inspect_err(|e| debug!(error = %e, "Failed to read record"))?);
        }

        Ok(list)
    }

    /// Overwrites an item's text and order.
    ///
    /// If another item already holds the requested order, the reorder shift
    /// runs first so the slot is vacated.
    pub fn update(&self, item: &TodoItem) -> Result<(), StoreError> {
        if self.order_taken_by_other(item.order, &item.id)? {
            self.reorder(&item.id, item.order)?;
        }

        let affected = self
            .tx
            .execute(
                r#"UPDATE todolist SET item = ?1, "order" = ?2 WHERE id = ?3"#,
                params![item.item, item.order, item.id],
            )
            .inspect_err(|e| debug!(error = %e, "Failed to update item"))?;

        if affected == 0 {
            debug!(id = %item.id, "Unknown ID");
            return Err(StoreError::NotFound(item.id.clone()));
        }

        Ok(())
    }

    /// Removes an item.
    ///
    /// The freed position stays empty unless the policy asks to close gaps.
    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let deleted_order = if self.policy.close_gaps_on_delete {
            self.current_order(id)?
        } else {
            None
        };

        let affected = self
            .tx
            .execute("DELETE FROM todolist WHERE id = ?1", params![id])
            .inspect_err(|e| debug!(error = %e, id, "Failed to delete item"))?;

        if affected == 0 {
            debug!(id, "Unknown ID");
            return Err(StoreError::NotFound(id.to_string()));
        }

        // Nothing can sit above the last representable order
        if let Some(low) = deleted_order.and_then(|order| order.checked_add(1)) {
            let above = self.rows_in_range(low, i64::MAX)?;
            self.shift(&above, -1, id)?;
        }

        Ok(())
    }

    /// Moves an item to `new_order`, sliding the items in between by one.
    pub fn reorder(&self, id: &str, new_order: i64) -> Result<(), StoreError> {
        self.check_id(id)?;

        let current_order = self
            .current_order(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if new_order == current_order {
            debug!(id, order = new_order, "Item already at requested order");
            return Ok(());
        }

        // Moving later: items in [current, new] slide down.
        // Moving earlier: items in [new, current] slide up.
        let (low, high, delta) = if new_order > current_order {
            (current_order, new_order, -1)
        } else {
            (new_order, current_order, 1)
        };

        let snapshot = self.rows_in_range(low, high)?;
        let shifted = self.shift(&snapshot, delta, id)?;

        if shifted == 0 {
            return Err(StoreError::NothingReordered);
        }

        self.set_order(id, new_order)
    }

    /// Counts, gaps and duplicates of the current orders
    pub fn order_report(&self) -> Result<OrderReport, StoreError> {
        let mut stmt = self
            .tx
            .prepare(r#"SELECT "order" FROM todolist ORDER BY "order""#)?;
        let orders = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;

        Ok(OrderReport::from_orders(&orders))
    }

    /// Rows whose order lies in `[low, high]`, ascending
    fn rows_in_range(&self, low: i64, high: i64) -> Result<Vec<TodoItem>, StoreError> {
        let mut stmt = self.tx.prepare(
            r#"SELECT id, item, "order" FROM todolist
               WHERE "order" >= ?1 AND "order" <= ?2
               ORDER BY "order""#,
        )?;

        let rows = stmt
            .query_map(params![low, high], read_item)?
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|e| debug!(error = %e, "Failed to get the current order list of items"))?;

        Ok(rows)
    }

    /// Adds `delta` to every row of `rows` except `skip_id`; returns how many moved
    fn shift(&self, rows: &[TodoItem], delta: i64, skip_id: &str) -> Result<usize, StoreError> {
        let mut shifted = 0;

        for row in rows.iter().filter(|r| r.id != skip_id) {
            self.set_order(&row.id, offset(row.order, delta)?)
                .inspect_err(|e| debug!(error = %e, "Failed to update items with new order"))?;
            shifted += 1;
        }

        Ok(shifted)
    }

    fn set_order(&self, id: &str, order: i64) -> Result<(), StoreError> {
        self.tx.execute(
            r#"UPDATE todolist SET "order" = ?1 WHERE id = ?2"#,
            params![order, id],
        )?;
        Ok(())
    }
}
