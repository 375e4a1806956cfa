//! In-process fallback backend
//!
//! Used for the lifetime of a store instance whose column-store
//! connection could not be established. Keeps the same TTL-expiry
//! semantics as the primary via a time-to-live cache, but holds no
//! distributed locks: a single-process store needs none.

use async_trait::async_trait;
use moka::future::Cache;

use crate::{
    config::StoreConfig,
    store::{session_key, SessionBackend},
    Result,
};

const FALLBACK_CAPACITY: u64 = 100_000;

/// Session backend holding sessions in process memory with TTL expiry
pub struct FallbackBackend {
    sessions: Cache<String, Vec<u8>>,
}

impl FallbackBackend {
    /// Create a fallback store honoring the configured session lifetime
    pub fn new(config: &StoreConfig) -> Self {
        let sessions = Cache::builder()
            .time_to_live(config.session_lifetime())
            .max_capacity(FALLBACK_CAPACITY)
            .build();
        Self { sessions }
    }

    /// Number of live sessions currently held
    pub fn len(&self) -> u64 {
        self.sessions.entry_count()
    }

    /// Whether the store holds no sessions
    pub fn is_empty(&self) -> bool {
        self.sessions.entry_count() == 0
    }

    /// Run cache maintenance so `len` reflects recent writes and evictions
    pub async fn run_pending_tasks(&self) {
        self.sessions.run_pending_tasks().await;
    }
}

#[async_trait]
impl SessionBackend for FallbackBackend {
    async fn read(&self, session_id: &str) -> Result<Vec<u8>> {
        let key = session_key(session_id);
        Ok(self.sessions.get(&key).await.unwrap_or_default())
    }

    async fn write(&self, session_id: &str, data: &[u8]) -> Result<()> {
        let key = session_key(session_id);
        self.sessions.insert(key, data.to_vec()).await;
        Ok(())
    }

    async fn destroy(&self, session_id: &str) -> Result<()> {
        let key = session_key(session_id);
        self.sessions.invalidate(&key).await;
        Ok(())
    }

    async fn gc(&self, _max_lifetime: u64) -> Result<()> {
        // Expiry is TTL-driven here too.
        Ok(())
    }

    fn name(&self) -> &str {
        "fallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fallback() -> FallbackBackend {
        FallbackBackend::new(&StoreConfig::default())
    }

    #[tokio::test]
    async fn test_unknown_session_reads_empty() {
        let store = fallback();
        assert!(store.read("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_read_destroy() {
        let store = fallback();

        store.write("visitor", b"payload").await.unwrap();
        assert_eq!(store.read("visitor").await.unwrap(), b"payload");

        store.destroy("visitor").await.unwrap();
        assert!(store.read("visitor").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sessions_expire_by_ttl() {
        let config = StoreConfig {
            session_lifetime: 1,
            ..StoreConfig::default()
        };
        let store = FallbackBackend::new(&config);

        store.write("brief", b"soon gone").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        assert!(store.read("brief").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_len_tracks_live_sessions() {
        let store = fallback();
        assert!(store.is_empty());

        store.write("a", b"1").await.unwrap();
        store.write("b", b"2").await.unwrap();
        store.run_pending_tasks().await;
        assert_eq!(store.len(), 2);
        assert!(!store.is_empty());

        store.destroy("a").await.unwrap();
        store.run_pending_tasks().await;
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_gc_is_a_no_op() {
        let store = fallback();
        store.write("kept", b"still here").await.unwrap();
        store.gc(1440).await.unwrap();
        assert_eq!(store.read("kept").await.unwrap(), b"still here");
    }
}
