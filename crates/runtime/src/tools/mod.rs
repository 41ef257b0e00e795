//! Tool discovery and execution over MCP.

pub mod errors;
mod launch;
mod mcp_client;
mod mcp_host;
pub mod registry;
mod r#trait;
mod types;

pub use errors::{ConnectionError, ToolError};
pub use launch::{Interpreters, ServerCommand};
pub use mcp_client::McpClient;
pub use mcp_host::{DEFAULT_CALL_TIMEOUT, DEFAULT_CONNECT_TIMEOUT, McpToolHost};
pub use r#trait::ToolHost;
pub use types::{AdvertisedTool, ToolCallResult};
