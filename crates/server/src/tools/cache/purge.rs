//! cache_purge tool implementation.
//!
//! Deletes a stale bucket by name.

use precache_client::{Network, Worker};
use precache_core::Error;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Name of the bucket to delete.
    pub bucket: String,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    pub bucket: String,
    /// False when no bucket had that name.
    pub deleted: bool,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl<N: Network>(worker: &Worker<N>, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    if params.bucket.trim().is_empty() {
        return Err(Error::InvalidInput("bucket cannot be empty".to_string()).into());
    }

    if params.bucket == worker.cache_name() {
        return Err(Error::InvalidInput(format!(
            "{} is the current bucket; bump cache_name and activate to replace it",
            params.bucket
        ))
        .into());
    }

    let deleted = worker.db().delete_bucket(&params.bucket).await?;
    tracing::info!("purge {}: deleted={}", params.bucket, deleted);

    json_result(&CachePurgeOutput { bucket: params.bucket, deleted })
}
