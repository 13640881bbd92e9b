//! Background sync

use crate::error::WorkerError;

/// Sync event fired by the host when connectivity returns
#[derive(Debug, Clone)]
pub struct SyncEvent {
    pub tag: String,
}

impl SyncEvent {
    pub fn new(tag: &str) -> Self {
        Self { tag: tag.to_string() }
    }
}

/// Run data reconciliation. Never fails: errors are logged and reported as `false`.
pub async fn sync_data() -> bool {
    match reconcile().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "background sync failed");
            false
        }
    }
}

async fn reconcile() -> Result<(), WorkerError> {
    tracing::info!("synchronizing data");
    // TODO: replay dashboard commands queued while offline once the page starts queuing them
    Ok(())
}
