//! Session backend trait and construction-time backend selection

use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    client::DatabaseClient, columnstore::ColumnStoreBackend, config::StoreConfig,
    fallback::FallbackBackend, metrics::LockMetrics, Result,
};

/// Prefix namespacing session rows from other data in the keyspace
pub const SESSION_PREFIX: &str = "sess_";

/// Normalize a caller-supplied session id into a row key
pub fn session_key(session_id: &str) -> String {
    format!("{SESSION_PREFIX}{session_id}")
}

/// `host|pid` identity attached to lock-protocol log lines, so logs from
/// concurrent holders on shared storage can be told apart.
pub(crate) fn process_identity() -> String {
    let host = hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string());
    format!("{host}|{}", std::process::id())
}

/// Trait for session storage backends
///
/// One backend instance serves one host process; concurrency control
/// across processes is the backend's concern (the column-store variant
/// uses cooperative locking, the in-process fallback needs none).
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Fetch session content, acquiring the session lock
    ///
    /// Never fails the caller: lock-wait exhaustion and query errors
    /// degrade to empty content.
    async fn read(&self, session_id: &str) -> Result<Vec<u8>>;

    /// Store session content and release the lock taken by `read`
    async fn write(&self, session_id: &str, data: &[u8]) -> Result<()>;

    /// Delete the session and its lock record
    async fn destroy(&self, session_id: &str) -> Result<()>;

    /// Periodic garbage collection hook; expiry is TTL-driven so this
    /// is a no-op for every backend (stray-lock cleanup belongs to
    /// [`Maintenance`](crate::Maintenance))
    async fn gc(&self, max_lifetime: u64) -> Result<()>;

    /// Name of this backend (for debugging/logging)
    fn name(&self) -> &str;
}

/// Select a backend once, at construction
///
/// Tries to connect the injected client; on success every operation goes
/// to the column store, on failure the store degrades to an in-process
/// TTL cache for the lifetime of the instance. The failure is terminal
/// for the primary: there is no per-call reconnect.
pub async fn connect_backend(
    config: StoreConfig,
    client: Arc<dyn DatabaseClient>,
    metrics: Arc<dyn LockMetrics>,
) -> Arc<dyn SessionBackend> {
    match client.connect().await {
        Ok(()) => Arc::new(ColumnStoreBackend::new(&config, client, metrics)),
        Err(e) => {
            tracing::error!(
                error = %e,
                "unable to connect to the column store, degrading to the in-process fallback"
            );
            Arc::new(FallbackBackend::new(&config))
        }
    }
}
