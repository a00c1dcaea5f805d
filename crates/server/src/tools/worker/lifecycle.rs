//! worker_install and worker_activate tool implementations.

use precache_client::{Network, Worker};
use rmcp::{ErrorData as McpError, model::CallToolResult};

use crate::tools::json_result;

/// Implementation of the worker_install tool.
pub async fn install_impl<N: Network>(worker: &Worker<N>) -> Result<CallToolResult, McpError> {
    let report = worker.install().await?;
    json_result(&report)
}

/// Implementation of the worker_activate tool.
pub async fn activate_impl<N: Network>(worker: &Worker<N>) -> Result<CallToolResult, McpError> {
    let report = worker.activate().await?;
    json_result(&report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{mock_origin, output_of, worker_for};
    use serde_json::Value;

    #[tokio::test]
    async fn test_install_then_activate() {
        let server = mock_origin().await;
        let worker = worker_for(&server).await;
        worker.db().open_bucket("site-v0").await.unwrap();

        let installed: Value = output_of(&install_impl(&worker).await.unwrap());
        assert_eq!(installed["bucket"], "site-v1");
        assert_eq!(installed["cached"].as_array().unwrap().len(), 2);
        assert_eq!(installed["root_excluded"], false);

        let activated: Value = output_of(&activate_impl(&worker).await.unwrap());
        assert_eq!(activated["kept"], "site-v1");
        assert_eq!(activated["deleted"], serde_json::json!(["site-v0"]));
    }

    #[tokio::test]
    async fn test_activate_before_install_errors() {
        let server = mock_origin().await;
        let worker = worker_for(&server).await;

        let err = activate_impl(&worker).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }
}
