//! Out-of-band maintenance
//!
//! Two jobs meant for a scheduler, not the request path:
//!
//! - [`Maintenance::reconcile_locks`] removes lock rows whose session
//!   expired or was destroyed while the lock lingered (a holder that
//!   crashed between `read` and `write`).
//! - [`Maintenance::trigger_compaction`] asks the storage engine to
//!   collect tombstones, but only on engine versions that support the
//!   command, and never fails the run when the admin tool is missing.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::process::Command;

use crate::{
    client::{DatabaseClient, Value},
    config::StoreConfig,
    statements, Result,
};

/// `nodetool garbagecollect` first shipped with Cassandra 3.10
const MIN_GARBAGECOLLECT_VERSION: (u32, u32, u32) = (3, 10, 0);

const NODETOOL: &str = "nodetool";
const GARBAGECOLLECT: &str = "garbagecollect";

/// Scheduled maintenance over the session keyspace
pub struct Maintenance {
    client: Arc<dyn DatabaseClient>,
    db: String,
    nodetool_path: Option<PathBuf>,
}

impl Maintenance {
    /// Create a maintenance runner over an injected client
    pub fn new(config: &StoreConfig, client: Arc<dyn DatabaseClient>) -> Self {
        Self {
            client,
            db: config.db.clone(),
            nodetool_path: config.nodetool_path.clone(),
        }
    }

    /// Remove lock rows with no corresponding session row
    ///
    /// One full scan of the lock table plus one point query per key;
    /// acceptable at maintenance cadence, not for request-path code.
    /// Queued deletes are flushed before the connection closes.
    pub async fn reconcile_locks(&self) -> Result<()> {
        self.client.connect().await?;
        let outcome = self.remove_stray_locks().await;
        self.close(outcome).await
    }

    async fn remove_stray_locks(&self) -> Result<()> {
        let lock_keys = self
            .client
            .query(&statements::select_lock_keys(&self.db), &[])
            .await?;

        let mut removed = 0usize;
        for row in lock_keys.fetch_all() {
            let Some(key) = row.get("sessionkey").and_then(Value::as_str) else {
                continue;
            };

            let count = self
                .client
                .query(&statements::count_session(&self.db), &[Value::from(key)])
                .await?
                .fetch_one()
                .and_then(Value::as_i64)
                .unwrap_or(0);

            if count == 0 {
                self.client
                    .enqueue(&statements::delete_lock(&self.db), &[Value::from(key)])
                    .await?;
                removed += 1;
            }
        }

        tracing::info!(removed, "reconciled stray session locks");
        Ok(())
    }

    /// Trigger tombstone compaction when the engine supports it
    ///
    /// Skips silently when the engine predates the command, when the
    /// version string is unparseable, or when the admin tool cannot be
    /// resolved. Compaction is best-effort: a nonzero exit is logged,
    /// never propagated.
    pub async fn trigger_compaction(&self) -> Result<()> {
        self.client.connect().await?;
        let outcome = self.compact_if_supported().await;
        self.close(outcome).await
    }

    /// Flush queued writes and close the connection; the connection is
    /// closed even when the flush or the job itself failed.
    async fn close(&self, outcome: Result<()>) -> Result<()> {
        let flushed = self.client.flush().await;
        self.client.disconnect().await?;
        flushed?;
        outcome
    }

    async fn compact_if_supported(&self) -> Result<()> {
        let version = self
            .client
            .query(statements::SELECT_RELEASE_VERSION, &[])
            .await?
            .fetch_one()
            .and_then(|v| v.as_str().map(str::to_owned));

        let Some(version) = version else {
            tracing::debug!("engine reported no release version, skipping compaction");
            return Ok(());
        };
        let Some(parsed) = parse_version(&version) else {
            tracing::warn!(%version, "unparseable release version, skipping compaction");
            return Ok(());
        };
        if parsed < MIN_GARBAGECOLLECT_VERSION {
            tracing::debug!(%version, "engine predates nodetool garbagecollect, skipping compaction");
            return Ok(());
        }

        let Some(tool) = self.resolve_nodetool() else {
            tracing::debug!("nodetool not found, skipping compaction");
            return Ok(());
        };

        match Command::new(&tool).arg(GARBAGECOLLECT).output().await {
            Ok(output) if output.status.success() => {
                tracing::info!(tool = %tool.display(), "tombstone compaction triggered");
            }
            Ok(output) => {
                tracing::warn!(
                    tool = %tool.display(),
                    code = ?output.status.code(),
                    "nodetool garbagecollect exited nonzero"
                );
            }
            Err(e) => {
                tracing::warn!(tool = %tool.display(), error = %e, "failed to run nodetool");
            }
        }
        Ok(())
    }

    /// The admin tool, from the configured bin directory or the PATH
    fn resolve_nodetool(&self) -> Option<PathBuf> {
        match &self.nodetool_path {
            Some(dir) => Some(dir.join(NODETOOL)),
            None => which::which(NODETOOL).ok(),
        }
    }
}

/// Parse `major.minor.patch` with optional non-numeric suffixes
/// (e.g. `3.11.4-SNAPSHOT`); missing components default to zero.
fn parse_version(version: &str) -> Option<(u32, u32, u32)> {
    let mut components = version.trim().split('.');
    let major = components.next().and_then(leading_number)?;
    let minor = components.next().and_then(leading_number).unwrap_or(0);
    let patch = components.next().and_then(leading_number).unwrap_or(0);
    Some((major, minor, patch))
}

fn leading_number(component: &str) -> Option<u32> {
    let digits: String = component
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
