//! Tether runtime: a tool-augmented chat loop over MCP.
//!
//! This crate bridges an LLM chat backend with the tools hosted by an MCP
//! server. A user query becomes a sequence of model calls interleaved with
//! tool invocations, and the tool results are folded back into the
//! conversation before the model answers.
//!
//! # Overview
//!
//! - **ToolHost**: a tool-hosting collaborator that lists and executes tools
//!   ([`McpToolHost`] talks to an MCP server over stdio).
//! - **Backend**: a trait abstracting LLM providers ([`CohereBackend`]),
//!   wrapped by [`ModelAdapter`] which bounds and validates every call.
//! - **Engine**: resolves one query, executing requested tool calls in order
//!   and recording them in an append-only [`Conversation`].
//! - **Session**: the read loop that owns the tool host for its lifetime.
//!
//! # Example
//!
//! ```ignore
//! use runtime::{CohereBackend, ModelAdapter, ServerCommand, SessionOptions};
//!
//! # async fn example() -> runtime::Result<()> {
//! let backend = CohereBackend::builder("api-key", "command-r-plus").build();
//! let server = ServerCommand::new("python3", ["weather.py"]);
//!
//! runtime::session::run(&server, ModelAdapter::new(backend), &SessionOptions::default()).await?;
//! # Ok(())
//! # }
//! ```

mod conversation;
pub mod engine;
mod error;
pub mod model;
mod providers;
pub mod session;
pub mod tools;

#[cfg(test)]
mod testing;

pub use conversation::Conversation;
pub use engine::{DEFAULT_MAX_TOOL_ROUNDS, Engine, Resolution, RoundOutcome};
pub use error::{Error, Result};
pub use model::{
    Backend, ModelAdapter, ModelError, ModelReply, Role, SamplingParams, ToolCallRequest,
    ToolDeclaration, Turn,
};
pub use providers::{COHERE_API_URL, CohereBackend, CohereBackendBuilder};
pub use session::{QUIT_COMMAND, Session, SessionOptions};
pub use tools::{
    ConnectionError, Interpreters, McpToolHost, ServerCommand, ToolCallResult, ToolError,
    ToolHost,
};
