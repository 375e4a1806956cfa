//! Column-store session backend
//!
//! Serializes concurrent access to one session's data with a cooperative
//! distributed lock: a counter column incremented on acquisition and
//! decremented on release. The counter is never read-modify-written on
//! the client, so concurrent acquisitions and releases apply safely
//! without compare-and-swap.
//!
//! A holder that dies without releasing would block the key forever, so
//! a reader that has been denied often enough to see the counter reach
//! `break_after` treats the lock as abandoned and force-acquires it.
//! Tracking denied attempts instead of wall-clock time bounds the worst
//! case wait without a separate lease or heartbeat mechanism.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    client::{DatabaseClient, Value},
    codec,
    config::StoreConfig,
    metrics::LockMetrics,
    statements,
    store::{process_identity, session_key, SessionBackend},
    Result,
};

/// Session backend persisting to a distributed column store
pub struct ColumnStoreBackend {
    client: Arc<dyn DatabaseClient>,
    metrics: Arc<dyn LockMetrics>,
    db: String,
    session_lifetime: u32,
    break_after: i64,
    fail_after: u32,
    retry_delay: Duration,
}

impl ColumnStoreBackend {
    /// Create a backend over an already-connected client
    pub fn new(
        config: &StoreConfig,
        client: Arc<dyn DatabaseClient>,
        metrics: Arc<dyn LockMetrics>,
    ) -> Self {
        Self {
            client,
            metrics,
            db: config.db.clone(),
            session_lifetime: config.session_lifetime,
            break_after: config.break_after,
            fail_after: config.fail_after.max(1),
            retry_delay: config.retry_delay(),
        }
    }

    /// Current lock counter for a key; a missing row means no session yet
    async fn current_locks(&self, key: &str) -> Result<i64> {
        let result = self
            .client
            .query(&statements::select_locks(&self.db), &[Value::from(key)])
            .await?;
        Ok(result.fetch_one().and_then(Value::as_i64).unwrap_or(0))
    }

    /// Take the lock, refresh the session row's TTL, and fetch content
    ///
    /// The increment and the TTL touch are fire-and-forget; only the
    /// content fetch blocks. The touch doubles as row creation on the
    /// first read of an unknown key.
    async fn acquire_and_fetch(&self, key: &str) -> Result<Vec<u8>> {
        self.client
            .enqueue(&statements::acquire_lock(&self.db), &[Value::from(key)])
            .await?;
        self.client
            .enqueue(
                &statements::touch_session(&self.db, self.session_lifetime),
                &[Value::from(key), Value::from(key)],
            )
            .await?;

        let result = self
            .client
            .query(&statements::select_content(&self.db), &[Value::from(key)])
            .await?;
        let content = result
            .fetch_one()
            .and_then(Value::as_bytes)
            .map(<[u8]>::to_vec)
            .unwrap_or_default();
        Ok(codec::decode(&content))
    }
}

#[async_trait]
impl SessionBackend for ColumnStoreBackend {
    async fn read(&self, session_id: &str) -> Result<Vec<u8>> {
        let key = session_key(session_id);
        let ident = process_identity();

        for attempt in 1..=self.fail_after {
            let locks = match self.current_locks(&key).await {
                Ok(locks) => locks,
                Err(e) => {
                    // Database errors are not retried, only lock contention is.
                    tracing::warn!(pid = %ident, key = %key, error = %e, "lock check failed");
                    return Ok(Vec::new());
                }
            };

            // A non-positive counter means the key is free; a counter that
            // climbed exactly to the break threshold means the previous
            // holder never released and we reclaim the lock.
            if locks <= 0 || locks == self.break_after {
                if locks > 0 {
                    self.metrics.lock_broken(&key);
                    tracing::info!(pid = %ident, key = %key, locks, "breaking abandoned session lock");
                }
                return match self.acquire_and_fetch(&key).await {
                    Ok(content) => Ok(content),
                    Err(e) => {
                        tracing::warn!(pid = %ident, key = %key, error = %e, "querying session data failed");
                        Ok(Vec::new())
                    }
                };
            }

            self.metrics.contention(&key);
            tracing::debug!(pid = %ident, key = %key, locks, attempt, "session lock held, retrying");

            if attempt == self.fail_after {
                break;
            }
            tokio::time::sleep(self.retry_delay).await;
        }

        // Fail soft rather than hang the request: an empty session is
        // served after the retry budget is spent.
        self.metrics.wait_exhausted(&key);
        tracing::warn!(pid = %ident, key = %key, "gave up waiting for session lock");
        Ok(Vec::new())
    }

    async fn write(&self, session_id: &str, data: &[u8]) -> Result<()> {
        let key = session_key(session_id);
        let payload = codec::encode(data);

        // No read-before-write: the write applies even if the lock was
        // broken by another process in the interim (last-writer-wins).
        if let Err(e) = self
            .client
            .enqueue(
                &statements::upsert_content(&self.db, self.session_lifetime),
                &[Value::Blob(payload), Value::from(key.as_str())],
            )
            .await
        {
            tracing::warn!(key = %key, error = %e, "queueing session write failed");
        }
        // Release regardless of the content write's fate, so the lock
        // taken by `read` does not stay held until the break threshold.
        if let Err(e) = self
            .client
            .enqueue(&statements::release_lock(&self.db), &[Value::from(key.as_str())])
            .await
        {
            tracing::warn!(key = %key, error = %e, "queueing lock release failed");
        }
        Ok(())
    }

    async fn destroy(&self, session_id: &str) -> Result<()> {
        let key = session_key(session_id);

        if let Err(e) = self
            .client
            .query(&statements::delete_session(&self.db), &[Value::from(key.as_str())])
            .await
        {
            tracing::warn!(key = %key, error = %e, "deleting session row failed");
        }
        if let Err(e) = self
            .client
            .enqueue(&statements::delete_lock(&self.db), &[Value::from(key.as_str())])
            .await
        {
            tracing::warn!(key = %key, error = %e, "queueing lock delete failed");
        }
        Ok(())
    }

    async fn gc(&self, _max_lifetime: u64) -> Result<()> {
        // Every write carries a TTL, so expired sessions vanish on their
        // own. Stray lock rows are reconciled out-of-band by Maintenance.
        Ok(())
    }

    fn name(&self) -> &str {
        "columnstore"
    }
}
