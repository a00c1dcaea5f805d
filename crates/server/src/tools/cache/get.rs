//! cache_get tool implementation.
//!
//! Retrieves the stored response for a URL from the current bucket.

use precache_client::{Network, Worker, fetch::canonicalize};
use precache_core::{Error, Request};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// The request URL to look up.
    pub url: String,

    /// Request method of the stored entry (default: GET).
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "GET".into()
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub bucket: String,
    pub url: String,
    /// Final URL of the stored response.
    pub response_url: String,
    pub status: u16,
    pub status_text: String,
    pub response_type: String,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body_bytes: usize,
}

/// Implementation of the cache_get tool.
pub async fn get_impl<N: Network>(worker: &Worker<N>, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let url = canonicalize(&params.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let request = Request::new(&params.method, url);

    let response = worker
        .db()
        .match_entry(worker.cache_name(), &request)
        .await?
        .ok_or_else(|| Error::CacheMiss(request.to_string()))?;

    let output = CacheGetOutput {
        bucket: worker.cache_name().to_string(),
        url: request.url.to_string(),
        response_url: response.url.clone(),
        status: response.status,
        status_text: response.status_text.clone(),
        response_type: response.response_type.as_str().to_string(),
        content_type: response.content_type().map(str::to_string),
        body_bytes: response.body.len(),
        headers: response.headers,
    };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{mock_origin, output_of, worker_for};

    #[tokio::test]
    async fn test_get_impl_missing() {
        let server = mock_origin().await;
        let worker = worker_for(&server).await;
        let params = CacheGetParams { url: format!("{}/nothing", server.uri()), method: "GET".into() };

        let err = get_impl(&worker, params).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
    }

    #[tokio::test]
    async fn test_get_impl_found() {
        let server = mock_origin().await;
        let worker = worker_for(&server).await;
        worker.install().await.unwrap();
        let params = CacheGetParams { url: format!("{}/app.js", server.uri()), method: "GET".into() };

        let output: CacheGetOutput = output_of(&get_impl(&worker, params).await.unwrap());

        assert_eq!(output.bucket, "site-v1");
        assert_eq!(output.status, 200);
        assert_eq!(output.body_bytes, "console.log(1)".len());
        assert_eq!(output.response_type, "basic");
    }
}
