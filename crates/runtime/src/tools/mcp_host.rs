//! MCP-backed tool host.

use super::{
    ConnectionError, McpClient, ServerCommand, ToolCallResult, ToolError, ToolHost, registry,
};
use crate::model::ToolDeclaration;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::info;

/// Default bound on connecting to and initializing a server.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default bound on a single tool call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Tool host backed by an MCP server process.
pub struct McpToolHost {
    client: McpClient,
    call_timeout: Duration,
}

impl McpToolHost {
    /// Spawn the server and connect to it within `connect_timeout`.
    pub async fn connect(
        command: &ServerCommand,
        connect_timeout: Duration,
    ) -> Result<Self, ConnectionError> {
        info!(server = %command, "launching tool server");
        let client = tokio::time::timeout(connect_timeout, McpClient::spawn(command))
            .await
            .map_err(|_| ConnectionError::Timeout(connect_timeout))??;

        Ok(Self::new(client))
    }

    /// Wrap a connected client.
    pub fn new(client: McpClient) -> Self {
        Self {
            client,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }
}

impl ToolHost for McpToolHost {
    async fn list_tools(&self) -> Result<Vec<ToolDeclaration>, ConnectionError> {
        let advertised = self.client.list_tools().await?;
        Ok(registry::normalize(advertised))
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<ToolCallResult, ToolError> {
        let timeout = self.call_timeout;
        tokio::time::timeout(timeout, self.client.call_tool(name, arguments))
            .await
            .map_err(|_| ToolError::Timeout(timeout.as_millis() as u64))?
    }

    async fn shutdown(self) {
        info!("shutting down tool server");
        self.client.shutdown().await;
    }
}
