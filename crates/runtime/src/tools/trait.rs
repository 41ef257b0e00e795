//! Tool host trait.

use crate::model::ToolDeclaration;
use crate::tools::{ConnectionError, ToolCallResult, ToolError};
use serde_json::{Map, Value};
use std::future::Future;

/// Trait for tool-hosting collaborators.
///
/// This is the boundary between the conversation loop and side effects.
/// A host is acquired once per session and released exactly once through
/// [`ToolHost::shutdown`].
pub trait ToolHost: Send + Sync {
    /// Discover the tools the host offers, normalized for the model.
    fn list_tools(
        &self,
    ) -> impl Future<Output = Result<Vec<ToolDeclaration>, ConnectionError>> + Send;

    /// Execute a tool call.
    ///
    /// A tool that ran and reported failure yields `Ok` with `is_error` set;
    /// `Err` means the call itself could not be completed.
    fn call_tool(
        &self,
        name: &str,
        arguments: &Map<String, Value>,
    ) -> impl Future<Output = Result<ToolCallResult, ToolError>> + Send;

    /// Release the connection.
    fn shutdown(self) -> impl Future<Output = ()> + Send
    where
        Self: Sized;
}
