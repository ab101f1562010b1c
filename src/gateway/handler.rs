use crate::completion::{ChatMessage, CompletionBackend, CompletionRequest};
use crate::config::CompletionConfig;
use crate::error::GatewayError;
use crate::gateway::types::*;
use serde_json::{json, Value};
use std::sync::Arc;

/// Transport-agnostic JSON-RPC handler
///
/// Holds only immutable state, so one instance is shared by every request.
pub struct Gateway {
    backend: Arc<dyn CompletionBackend>,
    model: String,
    temperature: f32,
}

impl Gateway {
    /// Create a gateway over a completion backend
    pub fn new(backend: Arc<dyn CompletionBackend>, config: &CompletionConfig) -> Self {
        Self {
            backend,
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }

    /// Process one JSON-RPC request. Always yields a response: every failure
    /// is mapped into an `error` payload carrying the request id.
    pub async fn process_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id;

        let call = match GatewayCall::parse(&request.method, request.params) {
            Ok(call) => call,
            Err(e) => {
                return JsonRpcResponse::error(id, error_codes::INVALID_PARAMS, e.to_string());
            }
        };

        match call {
            GatewayCall::Describe => JsonRpcResponse::result(id, describe_result()),
            GatewayCall::Parameters => JsonRpcResponse::result(id, parameters_result()),
            GatewayCall::Complete(params) => match self.complete(params).await {
                Ok(completion) => {
                    JsonRpcResponse::result(id, json!({ "completion": completion }))
                }
                Err(e) => {
                    log::warn!("Completion failed: {}", e);
                    JsonRpcResponse::error(id, error_codes::SERVER_ERROR, e.to_string())
                }
            },
            GatewayCall::Unknown(method) => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", method),
            ),
        }
    }

    /// Single-shot completion: system + user message, first choice verbatim
    async fn complete(&self, params: CompleteParams) -> Result<String, GatewayError> {
        log::debug!(
            "complete: model={} prompt_chars={}",
            self.model,
            params.prompt.chars().count()
        );

        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(params.system_prompt),
                ChatMessage::user(params.prompt),
            ],
            temperature: self.temperature,
        };

        self.backend.complete(request).await
    }
}

/// Fixed capability descriptor returned by `describe`
fn describe_result() -> Value {
    json!({
        "name": env!("CARGO_PKG_NAME"),
        "description": "Generates text completions with an OpenAI chat model",
        "methods": ["complete"]
    })
}

/// Fixed parameter schema returned by `parameters`
fn parameters_result() -> Value {
    json!({
        "parameters": {
            "prompt": {
                "type": "string",
                "description": "User prompt to complete"
            },
            "system_prompt": {
                "type": "string",
                "description": "System instruction for the model (default: \"You are a helpful assistant.\")"
            }
        }
    })
}
