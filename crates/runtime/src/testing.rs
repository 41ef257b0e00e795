//! Scripted collaborators shared by the unit tests.

use crate::model::{
    Backend, ModelError, ModelReply, ModelRequest, ParameterSpec, ToolCallRequest,
    ToolDeclaration, Turn,
};
use crate::tools::{ConnectionError, ToolCallResult, ToolError, ToolHost};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn declaration(name: &str) -> ToolDeclaration {
    ToolDeclaration {
        name: name.to_string(),
        description: format!("{name} tool"),
        parameters: BTreeMap::from([(
            "expr".to_string(),
            ParameterSpec {
                description: "expr".to_string(),
                kind: "string".to_string(),
                required: true,
            },
        )]),
    }
}

pub fn tool_call(name: &str, arguments: Value) -> ToolCallRequest {
    let arguments = match arguments {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    ToolCallRequest {
        tool_name: name.to_string(),
        arguments,
    }
}

pub fn calls(requests: impl IntoIterator<Item = ToolCallRequest>, text: &str) -> ModelReply {
    ModelReply {
        text: text.to_string(),
        tool_calls: requests.into_iter().collect(),
    }
}

/// An owned copy of a [`ModelRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub query: String,
    pub history: Vec<Turn>,
    pub tools: Option<Vec<ToolDeclaration>>,
}

#[derive(Default)]
struct BackendState {
    replies: Mutex<VecDeque<Result<ModelReply, ModelError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Backend that returns pre-scripted replies in order.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    state: Arc<BackendState>,
    delay: Option<Duration>,
}

impl ScriptedBackend {
    pub fn new(replies: impl IntoIterator<Item = Result<ModelReply, ModelError>>) -> Self {
        let backend = Self::default();
        backend.state.replies.lock().unwrap().extend(replies);
        backend
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

impl Backend for ScriptedBackend {
    async fn call(&self, request: ModelRequest<'_>) -> Result<ModelReply, ModelError> {
        self.state.requests.lock().unwrap().push(RecordedRequest {
            query: request.query.to_string(),
            history: request.history.to_vec(),
            tools: request.tools.map(<[_]>::to_vec),
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.state
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::InvalidResponse("script exhausted".into())))
    }
}

#[derive(Default)]
struct HostState {
    results: Mutex<VecDeque<Result<ToolCallResult, ToolError>>>,
    calls: Mutex<Vec<(String, Map<String, Value>)>>,
    listings: AtomicUsize,
    shutdowns: AtomicUsize,
}

/// Tool host with a fixed tool list and pre-scripted call results.
#[derive(Clone, Default)]
pub struct FakeToolHost {
    tools: Vec<ToolDeclaration>,
    unreachable: bool,
    state: Arc<HostState>,
}

impl FakeToolHost {
    pub fn new(tools: Vec<ToolDeclaration>) -> Self {
        Self {
            tools,
            ..Self::default()
        }
    }

    /// A host whose discovery always fails.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn with_results(
        self,
        results: impl IntoIterator<Item = Result<ToolCallResult, ToolError>>,
    ) -> Self {
        self.state.results.lock().unwrap().extend(results);
        self
    }

    pub fn calls(&self) -> Vec<(String, Map<String, Value>)> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn listings(&self) -> usize {
        self.state.listings.load(Ordering::SeqCst)
    }

    pub fn shutdowns(&self) -> usize {
        self.state.shutdowns.load(Ordering::SeqCst)
    }
}

impl ToolHost for FakeToolHost {
    async fn list_tools(&self) -> Result<Vec<ToolDeclaration>, ConnectionError> {
        self.state.listings.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            return Err(ConnectionError::Handshake("connection refused".into()));
        }
        Ok(self.tools.clone())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<ToolCallResult, ToolError> {
        self.state
            .calls
            .lock()
            .unwrap()
            .push((name.to_string(), arguments.clone()));
        self.state
            .results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ToolCallResult::success(name, "ok")))
    }

    async fn shutdown(self) {
        self.state.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}
