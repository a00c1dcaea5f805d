//! cache_list tool implementation.

use precache_client::{Network, Worker};
use precache_core::BucketSummary;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Output from the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheListOutput {
    /// Name of the bucket the worker serves from.
    pub current: String,
    /// Worker lifecycle state.
    pub state: String,
    /// All buckets in creation order.
    pub buckets: Vec<BucketSummary>,
}

/// Implementation of the cache_list tool.
pub async fn list_impl<N: Network>(worker: &Worker<N>) -> Result<CallToolResult, McpError> {
    let output = CacheListOutput {
        current: worker.cache_name().to_string(),
        state: worker.state().await.as_str().to_string(),
        buckets: worker.db().bucket_summaries().await?,
    };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{mock_origin, output_of, worker_for};

    #[tokio::test]
    async fn test_list_after_start() {
        let server = mock_origin().await;
        let worker = worker_for(&server).await;
        worker.start().await.unwrap();

        let output: CacheListOutput = output_of(&list_impl(&worker).await.unwrap());

        assert_eq!(output.current, "site-v1");
        assert_eq!(output.state, "activated");
        assert_eq!(output.buckets.len(), 1);
        assert_eq!(output.buckets[0].name, "site-v1");
        assert_eq!(output.buckets[0].entries, 2);
    }

    #[tokio::test]
    async fn test_list_before_start() {
        let server = mock_origin().await;
        let worker = worker_for(&server).await;

        let output: CacheListOutput = output_of(&list_impl(&worker).await.unwrap());

        assert_eq!(output.state, "parsed");
        assert!(output.buckets.is_empty());
    }
}
