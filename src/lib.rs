//! Session storage over a distributed column store
//!
//! This crate provides a session-storage backend on top of a
//! Cassandra-style column store, with cooperative distributed locking,
//! TTL-driven expiry, payload compression, and out-of-band maintenance
//! (stray-lock reconciliation and conditional tombstone compaction).
//!
//! The crate does not speak the wire protocol itself: callers inject a
//! [`DatabaseClient`] implementation and get back a [`SessionBackend`] —
//! the column-store variant when the connection succeeds, an in-process
//! TTL fallback when it does not.
//!
//! # Example
//!
//! ```
//! use colstore_session::{FallbackBackend, SessionBackend, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // The in-process variant; the column-store variant is built the
//!     // same way via `connect_backend` with an injected client.
//!     let store = FallbackBackend::new(&StoreConfig::default());
//!
//!     store.write("session-1", b"visitor state").await?;
//!     let content = store.read("session-1").await?;
//!     assert_eq!(content, b"visitor state");
//!
//!     store.destroy("session-1").await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod codec;
pub mod columnstore;
pub mod config;
pub mod error;
pub mod fallback;
pub mod maintenance;
pub mod metrics;
pub mod statements;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports
pub use client::{DatabaseClient, ResultSet, Row, Value};
pub use columnstore::ColumnStoreBackend;
pub use config::{load_config, load_config_or_default, StoreConfig};
pub use error::{Result, SessionError};
pub use fallback::FallbackBackend;
pub use maintenance::Maintenance;
pub use metrics::{LockCounters, LockMetrics, NoopMetrics};
pub use store::{connect_backend, session_key, SessionBackend, SESSION_PREFIX};
