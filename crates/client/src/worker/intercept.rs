//! Fetch phase: cache-first request handling with offline fallback.

use precache_core::{Request, Response};
use reqwest::StatusCode;
use serde::Serialize;

use super::{Worker, WorkerState};
use crate::fetch::Network;

/// Where a response handed back by the worker came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Bucket hit; the network was not consulted.
    Cache,
    /// Fresh network response.
    Network,
    /// Network failed; served the bucket's copy.
    Fallback,
    /// Network failed and nothing was cached; served the placeholder.
    Offline,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Cache => "cache",
            Source::Network => "network",
            Source::Fallback => "fallback",
            Source::Offline => "offline",
        }
    }
}

/// Result of intercepting a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The worker did not intercept; the caller goes to the network directly.
    Passthrough,
    Respond { response: Response, source: Source },
}

impl FetchOutcome {
    fn respond(response: Response, source: Source) -> Self {
        FetchOutcome::Respond { response, source }
    }

    pub fn response(&self) -> Option<&Response> {
        match self {
            FetchOutcome::Passthrough => None,
            FetchOutcome::Respond { response, .. } => Some(response),
        }
    }

    pub fn source(&self) -> Option<Source> {
        match self {
            FetchOutcome::Passthrough => None,
            FetchOutcome::Respond { source, .. } => Some(*source),
        }
    }
}

impl<N: Network> Worker<N> {
    /// Answer a request cache-first.
    ///
    /// Never fails: store errors degrade to cache misses and network errors
    /// degrade to the cached copy or the offline placeholder.
    pub async fn handle_fetch(&self, request: &Request) -> FetchOutcome {
        if !request.is_get() {
            return FetchOutcome::Passthrough;
        }

        if self.state().await != WorkerState::Activated {
            tracing::debug!("worker not active, passing through {}", request);
            return FetchOutcome::Passthrough;
        }

        if let Some(cached) = self.lookup(request).await {
            tracing::debug!("serving from cache: {}", request.url);
            return FetchOutcome::respond(cached, Source::Cache);
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_cacheable() {
                    self.store(request, &response).await;
                }
                FetchOutcome::respond(response, Source::Network)
            }
            Err(e) => {
                tracing::info!("offline, serving from cache: {} ({})", request.url, e);
                match self.lookup(request).await {
                    Some(cached) => FetchOutcome::respond(cached, Source::Fallback),
                    None => FetchOutcome::respond(self.placeholder(request), Source::Offline),
                }
            }
        }
    }

    fn placeholder(&self, request: &Request) -> Response {
        let status = self.config.offline_status;
        let reason = StatusCode::from_u16(status).ok().and_then(|s| s.canonical_reason()).unwrap_or("");
        Response::offline(&request.url, status, reason, &self.config.offline_body)
    }

    async fn lookup(&self, request: &Request) -> Option<Response> {
        match self.db.match_entry(&self.config.cache_name, request).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("cache lookup failed for {}: {}", request.url, e);
                None
            }
        }
    }

    async fn store(&self, request: &Request, response: &Response) {
        if let Err(e) = self.db.put_entry(&self.config.cache_name, request, response).await {
            tracing::warn!("failed to cache {}: {}", request.url, e);
        }
    }
}
