//! # Live Delta Hooks
//!
//! Forwards the store's post-commit change events to the remote as deltas.
//!
//! Lifecycle rules:
//! - attach only when an endpoint is configured AND live sync is enabled
//!   in settings; [`SyncHooks::apply_settings`] enforces both
//! - attaching twice is a no-op, guarded by a single flag (the presence of
//!   the forwarding task)
//! - detach as soon as either condition becomes false, and always on drop
//!
//! Forwarding is fire-and-forget: a failed delta is logged and skipped.
//! The local write has already committed and is never rolled back because
//! the network failed. There is no durable retry queue; a delta lost to a
//! network failure is re-converged by the next full push.

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::CloudClient;
use crate::error::{SyncError, SyncResult};
use omni_core::StoreSettings;
use omni_db::Database;

/// Live delta forwarding, attached to the store's change feed.
pub struct SyncHooks {
    db: Database,
    task: Option<JoinHandle<()>>,
}

impl SyncHooks {
    /// Creates detached hooks over the given database.
    pub fn new(db: Database) -> Self {
        SyncHooks { db, task: None }
    }

    /// Whether the forwarding task is currently attached.
    pub fn is_attached(&self) -> bool {
        self.task.is_some()
    }

    /// Attaches the forwarding task. A second attach is a no-op.
    pub fn attach(&mut self, client: CloudClient) {
        if self.task.is_some() {
            return;
        }

        let mut rx = self.db.events().subscribe();
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        debug!(table = %event.table, pk = event.pk, op = ?event.op, "Forwarding delta");
                        if let Err(e) = client.delta(&event).await {
                            // The local write is already committed; never
                            // surfaced, never retried.
                            warn!(
                                table = %event.table,
                                pk = event.pk,
                                error = %e,
                                "Delta sync failed"
                            );
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Delta hook lagged behind the change feed");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        self.task = Some(handle);
        info!("Live sync hooks attached");
    }

    /// Detaches the forwarding task. Idempotent.
    pub fn detach(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Live sync hooks detached");
        }
    }

    /// Reconciles the hook state with the current settings: attaches when
    /// an endpoint is configured and live sync is enabled, detaches the
    /// moment either condition no longer holds.
    pub fn apply_settings(&mut self, settings: &StoreSettings) -> SyncResult<()> {
        if settings.live_sync_active() {
            if self.task.is_none() {
                let client =
                    CloudClient::from_settings(settings)?.ok_or(SyncError::NotConfigured)?;
                self.attach(client);
            }
        } else {
            self.detach();
        }
        Ok(())
    }
}

impl Drop for SyncHooks {
    fn drop(&mut self) {
        self.detach();
    }
}
