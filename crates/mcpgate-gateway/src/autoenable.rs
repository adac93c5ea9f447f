//! Background auto-enable: connects every configured child at startup
//! without blocking the HTTP listener.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::manager::ServerManager;

pub struct AutoEnableHandle {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl AutoEnableHandle {
    /// Signals cancellation and waits for the loop to observe it. Call this
    /// before `manager.shutdown()` during process shutdown.
    pub async fn cancel_and_join(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            warn!(error = %e, "auto-enable task panicked");
        }
    }
}

/// Spawns the background auto-enable loop.
pub fn spawn(manager: Arc<ServerManager>) -> AutoEnableHandle {
    let cancel = CancellationToken::new();
    let task_cancel = cancel.clone();

    let handle = tokio::spawn(async move {
        let ids = manager.server_ids();
        info!(count = ids.len(), "auto-enabling configured children");
        for id in ids {
            tokio::select! {
                _ = task_cancel.cancelled() => {
                    info!("auto-enable cancelled");
                    return;
                }
                result = manager.enable(&id) => {
                    match result {
                        Ok(()) => info!(child_id = %id, "auto-enabled"),
                        Err(e) => warn!(child_id = %id, error = %e, "auto-enable failed"),
                    }
                }
            }
        }
        info!("auto-enable complete");
    });

    AutoEnableHandle { cancel, handle }
}
