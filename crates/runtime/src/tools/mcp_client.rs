//! MCP (Model Context Protocol) client integration.
//!
//! Wraps the official rmcp SDK behind a small surface: spawn a server
//! process, list its tools, call a tool, shut it down.
//!
//! # Example
//!
//! ```ignore
//! use runtime::tools::{McpClient, ServerCommand};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = McpClient::spawn(&ServerCommand::new("mcp-filesystem", ["/tmp"])).await?;
//!
//! for tool in client.list_tools().await? {
//!     println!("Tool: {}", tool.name);
//! }
//! client.shutdown().await;
//! # Ok(())
//! # }
//! ```

use super::{AdvertisedTool, ConnectionError, ServerCommand, ToolCallResult, ToolError};
use rmcp::{
    ServiceExt,
    model::{CallToolRequestParams, Content, RawContent},
    service::{RoleClient, RunningService},
    transport::{ConfigureCommandExt, IntoTransport, TokioChildProcess},
};
use serde_json::{Map, Value};
use tokio::process::Command;
use tracing::{debug, warn};

const NON_TEXT_CONTENT: &str = "[non-text content]";

/// An MCP client connected to a server process.
pub struct McpClient {
    service: RunningService<RoleClient, ()>,
}

impl McpClient {
    /// Spawn an MCP server and complete the protocol handshake.
    pub async fn spawn(command: &ServerCommand) -> Result<Self, ConnectionError> {
        let transport = TokioChildProcess::new(Command::new(&command.program).configure(|cmd| {
            cmd.args(&command.args);
        }))
        .map_err(|source| ConnectionError::Spawn {
            command: command.to_string(),
            source,
        })?;

        let client = Self::connect(transport).await?;
        debug!(server = %command, "connected to MCP server");
        Ok(client)
    }

    /// Complete the protocol handshake over an already open transport.
    pub async fn connect<T, E, A>(transport: T) -> Result<Self, ConnectionError>
    where
        T: IntoTransport<RoleClient, E, A>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let service = ()
            .serve(transport)
            .await
            .map_err(|e| ConnectionError::Handshake(e.to_string()))?;
        Ok(Self { service })
    }

    /// List every tool the server advertises, following pagination.
    pub async fn list_tools(&self) -> Result<Vec<AdvertisedTool>, ConnectionError> {
        let tools = self
            .service
            .list_all_tools()
            .await
            .map_err(|e| ConnectionError::Discovery(e.to_string()))?;

        Ok(tools
            .into_iter()
            .map(|tool| AdvertisedTool {
                name: tool.name.to_string(),
                description: tool.description.map(|d| d.to_string()),
                input_schema: Value::Object((*tool.input_schema).clone()),
            })
            .collect())
    }

    /// Call a tool with the given name and arguments.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<ToolCallResult, ToolError> {
        let params = CallToolRequestParams {
            name: name.to_string().into(),
            arguments: Some(arguments.clone()),
            meta: None,
            task: None,
        };

        let result = self
            .service
            .call_tool(params)
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;

        Ok(ToolCallResult {
            tool_name: name.to_string(),
            content: flatten(&result.content),
            is_error: result.is_error.unwrap_or(false),
        })
    }

    /// Shut down the client and terminate the server process.
    pub async fn shutdown(self) {
        if let Err(e) = self.service.cancel().await {
            warn!(error = %e, "MCP client did not shut down cleanly");
        }
    }
}

fn flatten(content: &[Content]) -> String {
    content
        .iter()
        .map(|c| match &c.raw {
            RawContent::Text(t) => t.text.clone(),
            _ => NON_TEXT_CONTENT.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_joins_text_blocks() {
        let content = vec![Content::text("first"), Content::text("second")];
        assert_eq!(flatten(&content), "first\nsecond");
    }

    #[test]
    fn flatten_empty_is_empty() {
        assert_eq!(flatten(&[]), "");
    }

    #[tokio::test]
    async fn spawn_missing_program_is_connection_error() {
        let command = ServerCommand::new("/nonexistent/tether-test-server", Vec::<String>::new());
        let err = McpClient::spawn(&command).await.err().unwrap();
        assert!(matches!(
            err,
            ConnectionError::Spawn { .. } | ConnectionError::Handshake(_)
        ));
    }
}
