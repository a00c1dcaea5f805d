//! Offline-first worker lifecycle.
//!
//! The worker owns one cache store handle and one network, and moves through
//! the lifecycle below. Only an activated worker intercepts requests.
//!
//! ```text
//! Parsed -> Installing -> Installed -> Activating -> Activated
//!               |
//!               +-> Redundant (install failed)
//! ```
//!
//! - `install` seeds the current bucket with the configured asset list.
//! - `activate` deletes every bucket except the current one.
//! - `handle_fetch` answers GET requests cache-first.

mod activate;
mod install;
mod intercept;

#[cfg(test)]
mod test_support;

pub use activate::ActivateReport;
pub use install::InstallReport;
pub use intercept::{FetchOutcome, Source};

use precache_core::{AppConfig, CacheDb, Error};
use serde::Serialize;
use tokio::sync::RwLock;
use url::Url;

use crate::fetch::{Network, resolve_asset};

/// Worker settings derived from the application configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub cache_name: String,
    pub origin: Url,
    pub assets: Vec<String>,
    pub root_path: String,
    pub skip_waiting: bool,
    pub offline_status: u16,
    pub offline_body: String,
}

impl WorkerConfig {
    pub fn from_app_config(config: &AppConfig) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.origin)))?;
        Ok(Self {
            cache_name: config.cache_name.clone(),
            origin,
            assets: config.assets.clone(),
            root_path: config.root_path.clone(),
            skip_waiting: config.skip_waiting,
            offline_status: config.offline_status,
            offline_body: config.offline_body.clone(),
        })
    }

    /// Resolve an asset path against the origin.
    pub fn asset_url(&self, path: &str) -> Result<Url, Error> {
        resolve_asset(&self.origin, path).map_err(|e| Error::InvalidUrl(format!("{path}: {e}")))
    }
}

/// Lifecycle position of the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        }
    }
}

/// Outcome of [`Worker::start`].
#[derive(Debug, Clone, Serialize)]
pub struct StartReport {
    pub install: InstallReport,
    /// Present when the worker skipped waiting and activated right away.
    pub activate: Option<ActivateReport>,
}

/// Cache-first worker over a store and a network.
pub struct Worker<N> {
    db: CacheDb,
    network: N,
    config: WorkerConfig,
    state: RwLock<WorkerState>,
}

impl<N: Network> Worker<N> {
    pub fn new(db: CacheDb, network: N, config: WorkerConfig) -> Self {
        Self { db, network, config, state: RwLock::new(WorkerState::Parsed) }
    }

    /// Name of the current bucket.
    pub fn cache_name(&self) -> &str {
        &self.config.cache_name
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    async fn set_state(&self, state: WorkerState) {
        let mut current = self.state.write().await;
        if *current != state {
            tracing::debug!("worker state {} -> {}", current.as_str(), state.as_str());
            *current = state;
        }
    }

    /// Install, then activate immediately when `skip_waiting` is set.
    pub async fn start(&self) -> Result<StartReport, Error> {
        let install = self.install().await?;

        let activate = if self.config.skip_waiting {
            Some(self.activate().await?)
        } else {
            tracing::info!("installed; waiting for explicit activation");
            None
        };

        Ok(StartReport { install, activate })
    }
}
