use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during a single tool execution.
///
/// These never abort a round; they are recorded in the conversation as a
/// failed tool result.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("timeout after {0}ms")]
    Timeout(u64),
    #[error("execution failed: {0}")]
    Execution(String),
}

/// The tool server could not be reached, or broke the protocol.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to launch tool server `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("handshake with tool server failed: {0}")]
    Handshake(String),

    #[error("no response from tool server after {0:?}")]
    Timeout(Duration),

    #[error("tool discovery failed: {0}")]
    Discovery(String),
}
