//! Tool-related types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool exactly as the server advertised it, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvertisedTool {
    pub name: String,
    pub description: Option<String>,
    /// JSON Schema for the tool's input.
    pub input_schema: Value,
}

/// The outcome of one tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub tool_name: String,
    pub content: String,
    pub is_error: bool,
}

impl ToolCallResult {
    pub fn success(tool_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            content: content.into(),
            is_error: false,
        }
    }

    pub fn failure(tool_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            content: content.into(),
            is_error: true,
        }
    }
}
