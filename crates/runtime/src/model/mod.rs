//! LLM protocol types, backend trait and invocation adapter.

pub mod adapter;
pub mod errors;
pub mod types;

pub use adapter::{DEFAULT_MODEL_TIMEOUT, ModelAdapter};
pub use errors::ModelError;
pub use types::{
    Backend, ModelReply, ModelRequest, ParameterSpec, Role, SamplingParams, ToolCallRequest,
    ToolDeclaration, Turn,
};
