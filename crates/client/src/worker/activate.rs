//! Activate phase: drop stale buckets and start intercepting.

use precache_core::Error;
use serde::Serialize;

use super::{Worker, WorkerState};
use crate::fetch::Network;

/// Buckets kept and removed by activation.
#[derive(Debug, Clone, Serialize)]
pub struct ActivateReport {
    pub kept: String,
    pub deleted: Vec<String>,
}

impl<N: Network> Worker<N> {
    /// Delete every bucket whose name differs from the current one, then
    /// take control of requests.
    ///
    /// Only an installed (or already active) worker can activate.
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        let previous = self.state().await;
        if !matches!(previous, WorkerState::Installed | WorkerState::Activated) {
            return Err(Error::InvalidInput(format!("cannot activate a worker in state {}", previous.as_str())));
        }

        // An active worker keeps intercepting while it prunes again.
        if previous != WorkerState::Activated {
            self.set_state(WorkerState::Activating).await;
        }
        tracing::info!("activating worker for bucket {}", self.config.cache_name);

        match self.prune().await {
            Ok(deleted) => {
                self.set_state(WorkerState::Activated).await;
                Ok(ActivateReport { kept: self.config.cache_name.clone(), deleted })
            }
            Err(e) => {
                self.set_state(previous).await;
                tracing::error!("activation failed: {}", e);
                Err(e)
            }
        }
    }

    async fn prune(&self) -> Result<Vec<String>, Error> {
        let mut deleted = Vec::new();
        for name in self.db.bucket_names().await? {
            if name != self.config.cache_name {
                tracing::info!("deleting old cache: {}", name);
                if self.db.delete_bucket(&name).await? {
                    deleted.push(name);
                }
            }
        }
        Ok(deleted)
    }
}
