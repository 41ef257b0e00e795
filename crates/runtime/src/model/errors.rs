use std::time::Duration;
use thiserror::Error;

/// Errors from LLM provider calls.
///
/// Any of these aborts the current round.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    /// A network error occurred during the API call.
    #[error("network: {0}")]
    Network(String),

    /// The LLM provider returned an error response.
    #[error("provider api: {0}")]
    Api(String),

    /// The provider response could not be parsed.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    /// The call did not complete within the configured bound.
    #[error("model call timed out after {0:?}")]
    Timeout(Duration),

    /// The model asked for a tool that was not offered.
    #[error("model requested unknown tool `{0}`")]
    UnknownTool(String),

    /// The model asked for a tool on a call where no tools were offered.
    #[error("model requested tool `{0}` but no tools were offered")]
    UnofferedToolCall(String),
}
