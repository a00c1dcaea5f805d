//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the worker and cache tools.
use std::sync::Arc;

use crate::tools::cache::{CacheGetParams, CachePurgeParams, get_impl, list_impl, purge_impl};
use crate::tools::worker::{WorkerFetchParams, activate_impl, fetch_impl, install_impl};

use precache_client::{HttpNetwork, Worker};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for precache.
#[derive(Clone)]
pub struct PrecacheServer {
    worker: Arc<Worker<HttpNetwork>>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
#[tool_router]
impl PrecacheServer {
    /// Create a new server handler around a shared worker.
    pub fn new(worker: Arc<Worker<HttpNetwork>>) -> Self {
        Self { worker, tool_router: Self::tool_router() }
    }

    #[tool(
        description = "Request a URL through the offline-first worker. GET requests are answered cache-first with \
                       network fallback; other methods pass through to the network."
    )]
    async fn worker_fetch(&self, params: Parameters<WorkerFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(self.worker.as_ref(), params.0).await
    }

    #[tool(description = "Seed the current cache bucket with the configured asset list.")]
    async fn worker_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(self.worker.as_ref()).await
    }

    #[tool(description = "Delete every cache bucket except the current one and start intercepting requests.")]
    async fn worker_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(self.worker.as_ref()).await
    }

    #[tool(description = "List cache buckets with entry counts, plus the current bucket and worker state.")]
    async fn cache_list(&self) -> Result<CallToolResult, McpError> {
        list_impl(self.worker.as_ref()).await
    }

    #[tool(description = "Look up the stored response for a URL in the current cache bucket.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(self.worker.as_ref(), params.0).await
    }

    #[tool(description = "Delete a stale cache bucket by name. The current bucket cannot be purged.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(self.worker.as_ref(), params.0).await
    }
}

impl ServerHandler for PrecacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "precache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
