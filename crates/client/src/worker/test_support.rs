//! In-process network double for lifecycle tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use precache_core::{AppConfig, CacheDb, Error, Request, Response, ResponseType};
use url::Url;

use super::{Worker, WorkerConfig};
use crate::fetch::Network;

pub(crate) const ORIGIN: &str = "https://app.test/";

/// Network that answers from a route table and records every request.
///
/// Unrouted URLs fail like an unreachable host.
pub(crate) struct FakeNetwork {
    routes: Mutex<HashMap<String, Response>>,
    calls: Mutex<Vec<String>>,
    offline: AtomicBool,
}

impl FakeNetwork {
    pub(crate) fn new() -> Self {
        Self { routes: Mutex::new(HashMap::new()), calls: Mutex::new(Vec::new()), offline: AtomicBool::new(false) }
    }

    /// Serve every default asset with a 200 basic response.
    pub(crate) fn serving_assets() -> Self {
        let network = Self::new();
        for path in AppConfig::default().assets {
            let url = Url::parse(ORIGIN).unwrap().join(&path).unwrap();
            network.route(url.as_str(), 200, &format!("asset {path}"), ResponseType::Basic);
        }
        network
    }

    pub(crate) fn route(&self, url: &str, status: u16, body: &str, response_type: ResponseType) {
        let response = Response {
            url: url.to_string(),
            status,
            status_text: String::new(),
            headers: vec![("content-type".into(), "text/plain".into())],
            body: body.as_bytes().to_vec(),
            response_type,
        };
        self.routes.lock().unwrap().insert(url.to_string(), response);
    }

    pub(crate) fn unroute(&self, url: &str) {
        self.routes.lock().unwrap().remove(url);
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl Network for FakeNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        self.calls.lock().unwrap().push(request.to_string());

        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network("offline".into()));
        }

        self.routes
            .lock()
            .unwrap()
            .get(request.url.as_str())
            .cloned()
            .ok_or_else(|| Error::Network(format!("unreachable: {}", request.url)))
    }
}

/// Worker settings for bucket `app-v1` at [`ORIGIN`] with the default assets.
pub(crate) fn test_config() -> WorkerConfig {
    let app = AppConfig { origin: ORIGIN.into(), cache_name: "app-v1".into(), ..Default::default() };
    WorkerConfig::from_app_config(&app).unwrap()
}

/// Build a worker over an in-memory store, bucket `app-v1`, origin [`ORIGIN`].
pub(crate) async fn worker_with(
    network: FakeNetwork, tweak: impl FnOnce(&mut WorkerConfig),
) -> Worker<FakeNetwork> {
    let db = CacheDb::open_in_memory().await.unwrap();
    let mut config = test_config();
    tweak(&mut config);
    Worker::new(db, network, config)
}

pub(crate) fn get(url: &str) -> Request {
    Request::get(Url::parse(url).unwrap())
}
