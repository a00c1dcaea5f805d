//! worker_fetch tool implementation.
//!
//! Sends a request through the worker. Requests the worker does not
//! intercept go straight to the network so the caller always gets a response.

use precache_client::{FetchOutcome, Network, Worker, fetch::canonicalize};
use precache_core::{Error, Request, Response};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Input parameters for worker_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerFetchParams {
    /// The URL to request.
    pub url: String,

    /// HTTP method (default: GET). Only GET requests are intercepted.
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for worker_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerFetchOutput {
    /// The request URL after canonicalization.
    pub url: String,
    pub method: String,
    /// "cache", "network", "fallback", "offline", or "passthrough".
    pub source: String,
    pub status: u16,
    pub status_text: String,
    /// "basic", "cors", "opaque", or "error".
    pub response_type: String,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    /// Response body decoded as UTF-8 (lossy).
    pub body: String,
    pub body_bytes: usize,
}

impl WorkerFetchOutput {
    fn new(request: &Request, source: &str, response: Response) -> Self {
        Self {
            url: request.url.to_string(),
            method: request.method.clone(),
            source: source.to_string(),
            status: response.status,
            status_text: response.status_text.clone(),
            response_type: response.response_type.as_str().to_string(),
            content_type: response.content_type().map(str::to_string),
            body: String::from_utf8_lossy(&response.body).into_owned(),
            body_bytes: response.body.len(),
            headers: response.headers,
        }
    }
}

/// Implementation of the worker_fetch tool.
pub async fn fetch_impl<N: Network>(
    worker: &Worker<N>, params: WorkerFetchParams,
) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }
    if params.method.trim().is_empty() {
        return Err(Error::InvalidInput("method cannot be empty".into()).into());
    }

    let url = canonicalize(&params.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let request = Request::new(&params.method, url);

    let output = match worker.handle_fetch(&request).await {
        FetchOutcome::Respond { response, source } => WorkerFetchOutput::new(&request, source.as_str(), response),
        FetchOutcome::Passthrough => {
            tracing::debug!("passthrough {}", request);
            let response = worker.network().fetch(&request).await?;
            WorkerFetchOutput::new(&request, "passthrough", response)
        }
    };

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{mock_origin, output_of, worker_for};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    fn params(url: String, method: &str) -> WorkerFetchParams {
        WorkerFetchParams { url, method: method.into() }
    }

    #[tokio::test]
    async fn test_fetch_empty_url() {
        let server = mock_origin().await;
        let worker = worker_for(&server).await;

        let result = fetch_impl(&worker, params("  ".into(), "GET")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fetch_invalid_scheme() {
        let server = mock_origin().await;
        let worker = worker_for(&server).await;

        let err = fetch_impl(&worker, params("ftp://example.com/x".into(), "GET")).await.unwrap_err();
        assert_eq!(err.code.0, -32003);
    }

    #[tokio::test]
    async fn test_fetch_served_from_cache_after_start() {
        let server = mock_origin().await;
        let worker = worker_for(&server).await;
        worker.start().await.unwrap();

        let result = fetch_impl(&worker, params(format!("{}/app.js", server.uri()), "GET")).await.unwrap();
        let output: WorkerFetchOutput = output_of(&result);

        assert_eq!(output.source, "cache");
        assert_eq!(output.status, 200);
        assert_eq!(output.body, "console.log(1)");
        assert_eq!(output.response_type, "basic");
    }

    #[tokio::test]
    async fn test_fetch_before_activation_passes_through() {
        let server = mock_origin().await;
        let worker = worker_for(&server).await;

        let result = fetch_impl(&worker, params(format!("{}/", server.uri()), "GET")).await.unwrap();
        let output: WorkerFetchOutput = output_of(&result);

        assert_eq!(output.source, "passthrough");
        assert_eq!(output.body, "<h1>home</h1>");
    }

    #[tokio::test]
    async fn test_fetch_post_passes_through() {
        let server = mock_origin().await;
        Mock::given(method("POST"))
            .and(path("/api/save"))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;
        let worker = worker_for(&server).await;
        worker.start().await.unwrap();

        let result = fetch_impl(&worker, params(format!("{}/api/save", server.uri()), "post")).await.unwrap();
        let output: WorkerFetchOutput = output_of(&result);

        assert_eq!(output.source, "passthrough");
        assert_eq!(output.method, "POST");
        assert_eq!(output.status, 202);
    }

    #[tokio::test]
    async fn test_fetch_miss_goes_to_network() {
        let server = mock_origin().await;
        Mock::given(method("GET"))
            .and(path("/data.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;
        let worker = worker_for(&server).await;
        worker.start().await.unwrap();
        let url = format!("{}/data.json", server.uri());

        let first: WorkerFetchOutput = output_of(&fetch_impl(&worker, params(url.clone(), "GET")).await.unwrap());
        let second: WorkerFetchOutput = output_of(&fetch_impl(&worker, params(url, "GET")).await.unwrap());

        assert_eq!(first.source, "network");
        assert_eq!(second.source, "cache");
    }
}
