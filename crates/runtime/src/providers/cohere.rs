//! Cohere chat API backend.

use crate::model::{
    Backend, ModelError, ModelReply, ModelRequest, ParameterSpec, Role, SamplingParams,
    ToolCallRequest, ToolDeclaration, Turn,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Default chat endpoint.
pub const COHERE_API_URL: &str = "https://api.cohere.com/v1/chat";

const TOOL_ERROR_PREFIX: &str = "Error: ";

// ─────────────────────────────────────────────────────────────────────────────
// API Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    chat_history: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ApiTool<'a>>>,
    max_tokens: u32,
    temperature: f32,
    p: f32,
    k: u32,
    frequency_penalty: f32,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct ApiTool<'a> {
    name: &'a str,
    description: &'a str,
    parameter_definitions: BTreeMap<&'a str, ApiParameter<'a>>,
}

#[derive(Debug, Serialize)]
struct ApiParameter<'a> {
    description: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    required: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    text: String,
    #[serde(default)]
    tool_calls: Option<Vec<ApiToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ApiToolCall {
    name: String,
    #[serde(default)]
    parameters: Value,
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend Implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for creating a Cohere backend.
#[derive(Debug, Clone)]
pub struct CohereBackendBuilder {
    api_key: String,
    model: String,
    endpoint: String,
    sampling: SamplingParams,
}

impl CohereBackendBuilder {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            endpoint: COHERE_API_URL.to_string(),
            sampling: SamplingParams::default(),
        }
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn build(self) -> CohereBackend {
        CohereBackend {
            client: reqwest::Client::new(),
            api_key: self.api_key,
            model: self.model,
            endpoint: self.endpoint,
            sampling: self.sampling,
        }
    }
}

/// Backend speaking the Cohere chat format.
pub struct CohereBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    sampling: SamplingParams,
}

impl CohereBackend {
    pub fn builder(api_key: impl Into<String>, model: impl Into<String>) -> CohereBackendBuilder {
        CohereBackendBuilder::new(api_key, model)
    }

    fn role_to_api(role: Role) -> &'static str {
        match role {
            Role::User | Role::ToolResult => "USER",
            Role::Assistant => "CHATBOT",
        }
    }

    fn turn_to_api(turn: &Turn) -> ApiMessage {
        let message = if turn.is_error {
            format!("{TOOL_ERROR_PREFIX}{}", turn.content)
        } else {
            turn.content.clone()
        };
        ApiMessage {
            role: Self::role_to_api(turn.role),
            message,
        }
    }

    fn tool_to_api(tool: &ToolDeclaration) -> ApiTool<'_> {
        ApiTool {
            name: &tool.name,
            description: &tool.description,
            parameter_definitions: tool
                .parameters
                .iter()
                .map(|(name, spec)| (name.as_str(), Self::parameter_to_api(spec)))
                .collect(),
        }
    }

    fn parameter_to_api(spec: &ParameterSpec) -> ApiParameter<'_> {
        ApiParameter {
            description: &spec.description,
            kind: &spec.kind,
            required: spec.required,
        }
    }

    fn build_request<'a>(&'a self, request: &ModelRequest<'a>) -> ApiRequest<'a> {
        ApiRequest {
            model: &self.model,
            message: request.query,
            chat_history: request.history.iter().map(Self::turn_to_api).collect(),
            tools: request
                .tools
                .map(|tools| tools.iter().map(Self::tool_to_api).collect()),
            max_tokens: self.sampling.max_tokens,
            temperature: self.sampling.temperature,
            p: self.sampling.top_p,
            k: self.sampling.top_k,
            frequency_penalty: self.sampling.frequency_penalty,
        }
    }

    fn response_to_reply(response: ApiResponse) -> Result<ModelReply, ModelError> {
        let tool_calls = response
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| {
                let arguments = match call.parameters {
                    Value::Object(map) => map,
                    Value::Null => Map::new(),
                    other => {
                        return Err(ModelError::InvalidResponse(format!(
                            "parameters for `{}` are not an object: {other}",
                            call.name
                        )));
                    }
                };
                Ok(ToolCallRequest {
                    tool_name: call.name,
                    arguments,
                })
            })
            .collect::<Result<_, _>>()?;

        Ok(ModelReply {
            text: response.text,
            tool_calls,
        })
    }
}

impl std::fmt::Display for CohereBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cohere({})", self.model)
    }
}

impl Backend for CohereBackend {
    async fn call(&self, request: ModelRequest<'_>) -> Result<ModelReply, ModelError> {
        let api_request = self.build_request(&request);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("accept", "application/json")
            .json(&api_request)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api(format!("{status}: {body}")));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        Self::response_to_reply(api_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn backend() -> CohereBackend {
        CohereBackend::builder("key", "command-r-plus").build()
    }

    fn calculator() -> ToolDeclaration {
        ToolDeclaration {
            name: "calculator".into(),
            description: "Evaluate arithmetic".into(),
            parameters: BTreeMap::from([(
                "expr".into(),
                ParameterSpec {
                    description: "Expression".into(),
                    kind: "string".into(),
                    required: true,
                },
            )]),
        }
    }

    #[test]
    fn display_names_model() {
        assert_eq!(backend().to_string(), "cohere(command-r-plus)");
    }

    #[test]
    fn request_carries_tools_and_sampling() {
        let backend = backend();
        let tools = vec![calculator()];
        let request = ModelRequest {
            query: "What is 2+2?",
            history: &[],
            tools: Some(&tools),
        };

        let json = serde_json::to_value(backend.build_request(&request)).unwrap();
        assert_eq!(json["message"], "What is 2+2?");
        assert_eq!(json["model"], "command-r-plus");
        assert!(json.get("chat_history").is_none());
        assert_eq!(json["max_tokens"], 4000);
        assert_eq!(json["p"], 0.75);
        assert_eq!(
            json["tools"][0]["parameter_definitions"]["expr"],
            json!({"description": "Expression", "type": "string", "required": true})
        );
    }

    #[test]
    fn continuation_omits_tools_and_maps_roles() {
        let backend = backend();
        let history = vec![
            Turn::user("What is 2+2?"),
            Turn::assistant("Checking."),
            Turn::tool_result("4", false),
            Turn::tool_result("overflow", true),
        ];
        let request = ModelRequest {
            query: "4",
            history: &history,
            tools: None,
        };

        let json = serde_json::to_value(backend.build_request(&request)).unwrap();
        assert!(json.get("tools").is_none());
        assert_eq!(
            json["chat_history"],
            json!([
                {"role": "USER", "message": "What is 2+2?"},
                {"role": "CHATBOT", "message": "Checking."},
                {"role": "USER", "message": "4"},
                {"role": "USER", "message": "Error: overflow"},
            ])
        );
    }

    #[test]
    fn response_with_tool_calls() {
        let response: ApiResponse = serde_json::from_value(json!({
            "text": "",
            "tool_calls": [{"name": "calculator", "parameters": {"expr": "2+2"}}],
            "finish_reason": "COMPLETE"
        }))
        .unwrap();

        let reply = CohereBackend::response_to_reply(response).unwrap();
        assert_eq!(reply.tool_calls.len(), 1);
        assert_eq!(reply.tool_calls[0].tool_name, "calculator");
        assert_eq!(reply.tool_calls[0].arguments["expr"], "2+2");
    }

    #[test]
    fn response_without_tool_calls_is_terminal() {
        let response: ApiResponse =
            serde_json::from_value(json!({"text": "The answer is 4."})).unwrap();

        let reply = CohereBackend::response_to_reply(response).unwrap();
        assert_eq!(reply, ModelReply::text("The answer is 4."));
    }

    #[test]
    fn non_object_parameters_are_invalid() {
        let response: ApiResponse = serde_json::from_value(json!({
            "text": "",
            "tool_calls": [{"name": "calculator", "parameters": "2+2"}]
        }))
        .unwrap();

        let err = CohereBackend::response_to_reply(response).unwrap_err();
        assert!(matches!(err, ModelError::InvalidResponse(_)));
    }
}
