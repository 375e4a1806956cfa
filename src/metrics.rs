//! Lock protocol observability
//!
//! The backend reports lock-protocol events to an injected sink instead
//! of keeping process-wide counters. Callers that don't care pass
//! [`NoopMetrics`]; [`LockCounters`] keeps simple totals.

use std::sync::atomic::{AtomicU64, Ordering};

/// Sink for lock-protocol events
pub trait LockMetrics: Send + Sync {
    /// A read found the lock held by another process and will retry
    fn contention(&self, session_key: &str);

    /// A read force-acquired a lock whose counter hit the break threshold
    fn lock_broken(&self, session_key: &str);

    /// A read exhausted its retry budget and returned empty content
    fn wait_exhausted(&self, session_key: &str);
}

/// Sink that discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl LockMetrics for NoopMetrics {
    fn contention(&self, _session_key: &str) {}
    fn lock_broken(&self, _session_key: &str) {}
    fn wait_exhausted(&self, _session_key: &str) {}
}

/// Sink that counts events, for dashboards and tests
#[derive(Debug, Default)]
pub struct LockCounters {
    contention: AtomicU64,
    broken: AtomicU64,
    exhausted: AtomicU64,
}

impl LockCounters {
    /// Create a zeroed counter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Total denied acquisition attempts
    pub fn contention_count(&self) -> u64 {
        self.contention.load(Ordering::Relaxed)
    }

    /// Total force-broken locks
    pub fn broken_count(&self) -> u64 {
        self.broken.load(Ordering::Relaxed)
    }

    /// Total reads that gave up waiting
    pub fn exhausted_count(&self) -> u64 {
        self.exhausted.load(Ordering::Relaxed)
    }
}

impl LockMetrics for LockCounters {
    fn contention(&self, session_key: &str) {
        self.contention.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(key = %session_key, "session lock contended");
    }

    fn lock_broken(&self, session_key: &str) {
        self.broken.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(key = %session_key, "session lock broken");
    }

    fn wait_exhausted(&self, session_key: &str) {
        self.exhausted.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(key = %session_key, "session lock wait exhausted");
    }
}
