//! Model invocation with a per-call time bound and reply validation.

use super::{Backend, ModelError, ModelReply, ModelRequest, ToolDeclaration, Turn};
use std::time::Duration;
use tracing::debug;

/// Default bound on a single model call.
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(240);

/// Wraps a [`Backend`] and enforces the invocation contract.
///
/// Every reply is checked against the tools that were offered: a tool call
/// naming an undeclared tool, or any tool call when no tools were offered,
/// is rejected as a [`ModelError`].
pub struct ModelAdapter<B> {
    backend: B,
    timeout: Duration,
}

impl<B: Backend> ModelAdapter<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            timeout: DEFAULT_MODEL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Invoke the model. Does not touch conversation state.
    pub async fn invoke(
        &self,
        query: &str,
        history: &[Turn],
        tools: Option<&[ToolDeclaration]>,
    ) -> Result<ModelReply, ModelError> {
        debug!(
            history_len = history.len(),
            tools_offered = tools.map_or(0, <[_]>::len),
            "invoking model"
        );

        let request = ModelRequest {
            query,
            history,
            tools,
        };
        let reply = tokio::time::timeout(self.timeout, self.backend.call(request))
            .await
            .map_err(|_| ModelError::Timeout(self.timeout))??;

        validate(&reply, tools)?;
        Ok(reply)
    }
}

fn validate(reply: &ModelReply, tools: Option<&[ToolDeclaration]>) -> Result<(), ModelError> {
    for call in &reply.tool_calls {
        match tools {
            None => return Err(ModelError::UnofferedToolCall(call.tool_name.clone())),
            Some(tools) if !tools.iter().any(|t| t.name == call.tool_name) => {
                return Err(ModelError::UnknownTool(call.tool_name.clone()));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedBackend, declaration, tool_call};
    use serde_json::json;

    #[tokio::test]
    async fn passes_request_through_unchanged() {
        let backend = ScriptedBackend::new([Ok(ModelReply::text("hi"))]);
        let adapter = ModelAdapter::new(backend);
        let history = vec![Turn::user("earlier")];
        let tools = vec![declaration("calculator")];

        let reply = adapter.invoke("hello", &history, Some(&tools)).await.unwrap();
        assert_eq!(reply.text, "hi");

        let calls = adapter.backend().requests();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].query, "hello");
        assert_eq!(calls[0].history, history);
        assert_eq!(calls[0].tools, Some(tools));
    }

    #[tokio::test]
    async fn rejects_tool_calls_when_no_tools_offered() {
        let reply = ModelReply {
            text: String::new(),
            tool_calls: vec![tool_call("calculator", json!({"expr": "2+2"}))],
        };
        let adapter = ModelAdapter::new(ScriptedBackend::new([Ok(reply)]));

        let err = adapter.invoke("q", &[], None).await.unwrap_err();
        assert!(matches!(err, ModelError::UnofferedToolCall(name) if name == "calculator"));
    }

    #[tokio::test]
    async fn rejects_undeclared_tool_names() {
        let reply = ModelReply {
            text: String::new(),
            tool_calls: vec![tool_call("shell", json!({}))],
        };
        let adapter = ModelAdapter::new(ScriptedBackend::new([Ok(reply)]));
        let tools = vec![declaration("calculator")];

        let err = adapter.invoke("q", &[], Some(&tools)).await.unwrap_err();
        assert!(matches!(err, ModelError::UnknownTool(name) if name == "shell"));
    }

    #[tokio::test]
    async fn backend_errors_propagate() {
        let backend = ScriptedBackend::new([Err(ModelError::Api("429: quota".into()))]);
        let adapter = ModelAdapter::new(backend);

        let err = adapter.invoke("q", &[], None).await.unwrap_err();
        assert!(matches!(err, ModelError::Api(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_backend_times_out() {
        let backend = ScriptedBackend::new([Ok(ModelReply::text("late"))])
            .with_delay(Duration::from_secs(10));
        let adapter = ModelAdapter::new(backend).with_timeout(Duration::from_secs(1));

        let err = adapter.invoke("q", &[], None).await.unwrap_err();
        assert!(matches!(err, ModelError::Timeout(d) if d == Duration::from_secs(1)));
    }
}
