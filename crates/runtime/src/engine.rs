//! Tool-call execution engine.
//!
//! Resolves one user query into a final answer. The engine alternates
//! between awaiting the model and executing the tool calls it requested:
//!
//! ```text
//! AwaitingModel ──(no tool calls)──▶ Done
//!      ▲                │
//!      │          (tool calls)
//!      │                ▼
//!      └────────── ExecutingTools
//! ```
//!
//! Tools are offered to the model only on the first
//! [`DEFAULT_MAX_TOOL_ROUNDS`] calls of a round. Continuation calls carry no
//! tool declarations, so every round terminates.

use crate::conversation::Conversation;
use crate::model::{Backend, ModelAdapter, ToolCallRequest, ToolDeclaration};
use crate::tools::{ToolCallResult, ToolHost};
use crate::{Error, Result};
use serde_json::Value;
use tracing::{debug, info, warn};

/// How many model calls per round may be offered tools.
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 1;

/// Stands in for empty tool output in a continuation query, which must not
/// be empty.
const EMPTY_TOOL_OUTPUT: &str = "(no output)";

/// A successfully resolved round.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Assistant-visible output: tool annotations followed by the answer.
    pub text: String,
    /// The history accumulated while resolving the round.
    pub conversation: Conversation,
    pub model_calls: usize,
}

/// Outcome of one round, success or failure with a diagnostic.
#[derive(Debug)]
pub enum RoundOutcome {
    Answered(Resolution),
    Failed(Error),
}

enum State {
    AwaitingModel { query: String },
    ExecutingTools { calls: Vec<ToolCallRequest> },
    Done { text: String },
}

/// Drives a single query through model and tool calls.
pub struct Engine<'a, B, H> {
    adapter: &'a ModelAdapter<B>,
    host: &'a H,
    tools: &'a [ToolDeclaration],
    max_tool_rounds: usize,
}

impl<'a, B: Backend, H: ToolHost> Engine<'a, B, H> {
    pub fn new(adapter: &'a ModelAdapter<B>, host: &'a H, tools: &'a [ToolDeclaration]) -> Self {
        Self {
            adapter,
            host,
            tools,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    pub fn with_max_tool_rounds(mut self, max_tool_rounds: usize) -> Self {
        self.max_tool_rounds = max_tool_rounds;
        self
    }

    /// Run one round, turning any failure into [`RoundOutcome::Failed`].
    pub async fn run_round(&self, query: &str) -> RoundOutcome {
        match self.resolve(query).await {
            Ok(resolution) => RoundOutcome::Answered(resolution),
            Err(e) => RoundOutcome::Failed(e),
        }
    }

    /// Resolve a query with a fresh, empty history.
    ///
    /// Tool failures are recorded in the history and do not fail the round;
    /// model failures do.
    pub async fn resolve(&self, query: &str) -> Result<Resolution> {
        let mut conversation = Conversation::new();
        let mut trace = Vec::new();
        let mut model_calls = 0;
        let mut state = State::AwaitingModel {
            query: query.to_string(),
        };

        loop {
            state = match state {
                State::AwaitingModel { query: message } => {
                    let tools = (model_calls < self.max_tool_rounds).then_some(self.tools);
                    debug!(
                        call = model_calls + 1,
                        tools_offered = tools.is_some(),
                        "awaiting model"
                    );
                    let reply = self
                        .adapter
                        .invoke(&message, conversation.turns(), tools)
                        .await;
                    if model_calls == 0 {
                        conversation.push_user(query);
                    }
                    model_calls += 1;
                    let reply = reply?;

                    if reply.is_terminal() {
                        State::Done { text: reply.text }
                    } else {
                        if !reply.text.is_empty() {
                            conversation.push_assistant(reply.text.clone());
                            trace.push(reply.text);
                        }
                        State::ExecutingTools {
                            calls: reply.tool_calls,
                        }
                    }
                }
                State::ExecutingTools { calls } => {
                    let mut contents = Vec::with_capacity(calls.len());
                    for call in &calls {
                        trace.push(annotation(call));
                        let result = self.execute(call).await;
                        conversation.push_tool_result(result.content.clone(), result.is_error);
                        if result.content.is_empty() {
                            contents.push(EMPTY_TOOL_OUTPUT.to_string());
                        } else {
                            contents.push(result.content);
                        }
                    }
                    State::AwaitingModel {
                        query: contents.join("\n"),
                    }
                }
                State::Done { text } => {
                    if !text.is_empty() || trace.is_empty() {
                        trace.push(text);
                    }
                    info!(model_calls, turns = conversation.len(), "round resolved");
                    return Ok(Resolution {
                        text: trace.join("\n"),
                        conversation,
                        model_calls,
                    });
                }
            };
        }
    }

    async fn execute(&self, call: &ToolCallRequest) -> ToolCallResult {
        info!(tool = %call.tool_name, "calling tool");
        match self.host.call_tool(&call.tool_name, &call.arguments).await {
            Ok(result) => {
                if result.is_error {
                    warn!(tool = %call.tool_name, "tool reported an error");
                }
                result
            }
            Err(e) => {
                warn!(tool = %call.tool_name, error = %e, "tool call failed");
                ToolCallResult::failure(&call.tool_name, e.to_string())
            }
        }
    }
}

fn annotation(call: &ToolCallRequest) -> String {
    format!(
        "[Calling tool {} with args {}]",
        call.tool_name,
        Value::Object(call.arguments.clone())
    )
}
