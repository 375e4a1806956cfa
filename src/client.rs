//! Database client capability
//!
//! The session store does not speak the column-store wire protocol itself;
//! it is handed a [`DatabaseClient`] implementation by its caller. The trait
//! is the minimum surface the locking protocol needs: a connect/disconnect
//! pair, a synchronous query, a fire-and-forget queued write, and a flush
//! that blocks until queued writes are acknowledged.
//!
//! Implementations must request strong consistency (acknowledgment from all
//! replicas) for every statement; the lock-break algorithm assumes a lock
//! read always reflects the latest write.

use async_trait::async_trait;

use crate::Result;

/// A value bound to a statement parameter or returned in a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// UTF-8 text
    Text(String),
    /// Binary blob
    Blob(Vec<u8>),
    /// 64-bit integer (counters, counts)
    BigInt(i64),
}

impl Value {
    /// The contained text, if this is a text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The contained bytes; text values are visible as their UTF-8 bytes
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(b) => Some(b),
            Value::Text(s) => Some(s.as_bytes()),
            Value::BigInt(_) => None,
        }
    }

    /// The contained integer, if this is an integer value
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::BigInt(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Blob(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::BigInt(n)
    }
}

/// One result row: column name → value, in select order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    /// Build a row from (column, value) pairs
    pub fn new(columns: Vec<(String, Value)>) -> Self {
        Self { columns }
    }

    /// Look up a column by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(col, _)| col == name)
            .map(|(_, value)| value)
    }

    /// The first column's value
    pub fn first(&self) -> Option<&Value> {
        self.columns.first().map(|(_, value)| value)
    }
}

/// The rows returned by a synchronous query
///
/// "No rows" is an empty result set, never an error; query failures
/// surface as [`SessionError::Query`](crate::SessionError::Query).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    rows: Vec<Row>,
}

impl ResultSet {
    /// An empty result set (no matching rows)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a result set from rows
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Build a single-row, single-column result set
    pub fn scalar(column: &str, value: Value) -> Self {
        Self {
            rows: vec![Row::new(vec![(column.to_string(), value)])],
        }
    }

    /// The first row's first column, or `None` when no rows matched
    pub fn fetch_one(&self) -> Option<&Value> {
        self.rows.first().and_then(Row::first)
    }

    /// All rows, in select order
    pub fn fetch_all(&self) -> &[Row] {
        &self.rows
    }

    /// Whether the result set has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Minimum column-store capability consumed by the session store
///
/// Queued writes (`enqueue`) are fire-and-forget: they are considered
/// issued once accepted for delivery, and must be flushed before the
/// connection is closed or they may be silently dropped.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Establish the connection; fails with `SessionError::Connection`
    async fn connect(&self) -> Result<()>;

    /// Blocking read: run a parameterized statement and return its rows
    async fn query(&self, statement: &str, params: &[Value]) -> Result<ResultSet>;

    /// Fire-and-forget write: queue a parameterized statement for delivery
    async fn enqueue(&self, statement: &str, params: &[Value]) -> Result<()>;

    /// Block until all queued writes are acknowledged
    async fn flush(&self) -> Result<()>;

    /// Close the connection
    async fn disconnect(&self) -> Result<()>;
}
