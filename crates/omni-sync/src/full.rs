//! # Full Push / Pull
//!
//! Wholesale replacement of the syncable tables between local and remote,
//! plus the first-run bootstrap. Failures here are blocking for the
//! explicit push/pull commands (the user asked and needs to know), but the
//! startup bootstrap degrades to a logged warning: the application always
//! proceeds with local data.

use tracing::{info, warn};

use crate::client::CloudClient;
use crate::error::SyncResult;
use omni_db::Database;

/// Uploads every row of the syncable tables; the remote full-replaces.
pub async fn push_full(db: &Database, client: &CloudClient) -> SyncResult<()> {
    let snapshot = db.export_snapshot().await?;
    client.push(&snapshot).await?;

    info!(rows = snapshot.row_count(), "Full push complete");
    Ok(())
}

/// Downloads the remote snapshot and applies it as a clear-and-replace in
/// one atomic unit, so readers never observe a half-replaced store.
pub async fn pull_full(db: &Database, client: &CloudClient) -> SyncResult<()> {
    let snapshot = client.pull().await?;
    db.import_snapshot(&snapshot).await?;

    info!(rows = snapshot.row_count(), "Full pull complete");
    Ok(())
}

/// First-run bootstrap: when live sync is enabled, an endpoint is
/// configured, and the local store holds no data yet, pull once.
///
/// Returns whether a pull happened. Failure is non-fatal by design: it is
/// logged and the application continues with local (empty) data.
pub async fn bootstrap_if_first_run(db: &Database) -> SyncResult<bool> {
    let settings = db.settings().get().await?;
    if !settings.live_sync_active() {
        return Ok(false);
    }
    if !db.is_store_empty().await? {
        return Ok(false);
    }

    let Some(client) = CloudClient::from_settings(&settings)? else {
        return Ok(false);
    };

    info!("First session with cloud sync enabled; pulling remote state");

    match pull_full(db, &client).await {
        Ok(()) => Ok(true),
        Err(e) => {
            warn!(error = %e, "Initial sync failed; continuing with local data");
            Ok(false)
        }
    }
}
