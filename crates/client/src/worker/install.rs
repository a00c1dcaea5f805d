//! Install phase: seed the current bucket with the asset list.

use chrono::Utc;
use precache_core::{Error, Request, Response};
use serde::Serialize;

use super::{Worker, WorkerState};
use crate::fetch::Network;

/// What the install phase stored.
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub bucket: String,
    /// Request URLs now in the bucket from this install.
    pub cached: Vec<String>,
    /// True when the full list failed and the root path was left out.
    pub root_excluded: bool,
    pub installed_at: String,
}

impl<N: Network> Worker<N> {
    /// Seed the bucket with every configured asset.
    ///
    /// Seeding is all-or-nothing: any transport failure or non-2xx status
    /// stores nothing. When the full list fails, one retry runs without the
    /// root path. A failed retry leaves the worker redundant, unless it was
    /// already activated, in which case it keeps serving.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        let was_active = self.state().await == WorkerState::Activated;
        if !was_active {
            self.set_state(WorkerState::Installing).await;
        }

        tracing::info!("installing worker into bucket {}", self.config.cache_name);

        match self.seed().await {
            Ok(report) => {
                if !was_active {
                    self.set_state(WorkerState::Installed).await;
                }
                tracing::info!("cached {} assets in {}", report.cached.len(), report.bucket);
                Ok(report)
            }
            Err(e) => {
                if !was_active {
                    self.set_state(WorkerState::Redundant).await;
                }
                tracing::error!("install failed: {}", e);
                Err(e)
            }
        }
    }

    async fn seed(&self) -> Result<InstallReport, Error> {
        self.db.open_bucket(&self.config.cache_name).await?;

        let full = self.config.assets.clone();
        match self.add_all(&full).await {
            Ok(cached) => Ok(self.report(cached, false)),
            Err(e) => {
                tracing::warn!("some assets failed to cache, retrying without {}: {}", self.config.root_path, e);

                let without_root: Vec<String> =
                    full.into_iter().filter(|path| path != &self.config.root_path).collect();

                let cached = self
                    .add_all(&without_root)
                    .await
                    .map_err(|e| Error::InstallFailed(e.to_string()))?;
                Ok(self.report(cached, true))
            }
        }
    }

    /// Fetch every path, then store all responses in one transaction.
    async fn add_all(&self, paths: &[String]) -> Result<Vec<String>, Error> {
        let mut pairs: Vec<(Request, Response)> = Vec::with_capacity(paths.len());

        for path in paths {
            let request = Request::get(self.config.asset_url(path)?);
            let response = self.network.fetch(&request).await?;
            if !response.ok() {
                return Err(Error::Network(format!("{} returned status {}", request.url, response.status)));
            }
            pairs.push((request, response));
        }

        let cached = pairs.iter().map(|(req, _)| req.url.to_string()).collect();
        self.db.put_entries(&self.config.cache_name, pairs).await?;
        Ok(cached)
    }

    fn report(&self, cached: Vec<String>, root_excluded: bool) -> InstallReport {
        InstallReport {
            bucket: self.config.cache_name.clone(),
            cached,
            root_excluded,
            installed_at: Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{FakeNetwork, ORIGIN, worker_with};
    use super::*;
    use precache_core::ResponseType;

    #[tokio::test]
    async fn test_install_caches_full_asset_list() {
        let worker = worker_with(FakeNetwork::serving_assets(), |_| {}).await;

        let report = worker.install().await.unwrap();

        assert!(!report.root_excluded);
        assert_eq!(report.cached.len(), 6);
        assert_eq!(report.cached[0], ORIGIN);

        let urls = worker.db().entry_urls("app-v1").await.unwrap();
        assert_eq!(urls.len(), 6);
        assert!(urls.contains(&"https://app.test/".to_string()));
        assert!(urls.contains(&"https://app.test/icon-512.png".to_string()));
        assert_eq!(worker.state().await, WorkerState::Installed);
    }

    #[tokio::test]
    async fn test_install_retries_without_root_on_network_failure() {
        let network = FakeNetwork::serving_assets();
        network.unroute(ORIGIN);
        let worker = worker_with(network, |_| {}).await;

        let report = worker.install().await.unwrap();

        assert!(report.root_excluded);
        assert_eq!(report.cached.len(), 5);

        let urls = worker.db().entry_urls("app-v1").await.unwrap();
        assert_eq!(urls.len(), 5);
        assert!(!urls.contains(&ORIGIN.to_string()));
    }

    #[tokio::test]
    async fn test_install_retries_without_root_on_error_status() {
        let network = FakeNetwork::serving_assets();
        network.route(ORIGIN, 404, "not found", ResponseType::Basic);
        let worker = worker_with(network, |_| {}).await;

        let report = worker.install().await.unwrap();

        assert!(report.root_excluded);
        assert!(!worker.db().entry_urls("app-v1").await.unwrap().contains(&ORIGIN.to_string()));
    }

    #[tokio::test]
    async fn test_install_partial_failure_stores_nothing_from_first_attempt() {
        let network = FakeNetwork::serving_assets();
        network.unroute("https://app.test/icon-512.png");
        let worker = worker_with(network, |_| {}).await;

        let result = worker.install().await;

        assert!(matches!(result, Err(Error::InstallFailed(_))));
        assert!(worker.db().entry_urls("app-v1").await.unwrap().is_empty());
        assert_eq!(worker.state().await, WorkerState::Redundant);
    }

    #[tokio::test]
    async fn test_install_retry_fetches_each_remaining_asset_again() {
        let network = FakeNetwork::serving_assets();
        network.unroute(ORIGIN);
        let worker = worker_with(network, |_| {}).await;

        worker.install().await.unwrap();

        let calls = worker.network().calls();
        // First attempt stops at the root; the retry fetches the other five.
        assert_eq!(calls.len(), 6);
        assert_eq!(calls[0], format!("GET {ORIGIN}"));
        assert!(calls[1..].iter().all(|c| c != &format!("GET {ORIGIN}")));
    }

    #[tokio::test]
    async fn test_install_empty_asset_list() {
        let worker = worker_with(FakeNetwork::new(), |c| c.assets.clear()).await;

        let report = worker.install().await.unwrap();

        assert!(report.cached.is_empty());
        assert!(worker.db().has_bucket("app-v1").await.unwrap());
    }

    #[tokio::test]
    async fn test_reinstall_while_active_keeps_serving() {
        let network = FakeNetwork::serving_assets();
        let worker = worker_with(network, |_| {}).await;
        worker.start().await.unwrap();

        worker.network().set_offline(true);
        assert!(worker.install().await.is_err());

        assert_eq!(worker.state().await, WorkerState::Activated);
    }
}
