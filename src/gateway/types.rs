use crate::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 request envelope
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// Expected to be "2.0"; not checked
    pub jsonrpc: String,
    pub id: JsonRpcId,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 ID (string or integer), echoed back untouched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcId {
    String(String),
    Number(i64),
    /// Integers above `i64::MAX`
    Unsigned(u64),
}

impl From<JsonRpcId> for Value {
    fn from(id: JsonRpcId) -> Self {
        match id {
            JsonRpcId::String(s) => Value::String(s),
            JsonRpcId::Number(n) => Value::Number(n.into()),
            JsonRpcId::Unsigned(n) => Value::Number(n.into()),
        }
    }
}

/// JSON-RPC 2.0 response envelope
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(flatten)]
    pub payload: JsonRpcResponsePayload,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum JsonRpcResponsePayload {
    Result { result: Value },
    Error { error: JsonRpcError },
}

/// JSON-RPC 2.0 error
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcResponse {
    pub fn result(id: impl Into<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.into(),
            payload: JsonRpcResponsePayload::Result { result },
        }
    }

    pub fn error(id: impl Into<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.into(),
            payload: JsonRpcResponsePayload::Error {
                error: JsonRpcError {
                    code,
                    message: message.into(),
                },
            },
        }
    }
}

/// Default system instruction for `complete`
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

/// `complete` parameters, defaults applied at deserialization
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompleteParams {
    #[serde(default)]
    pub prompt: String,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for CompleteParams {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            system_prompt: default_system_prompt(),
        }
    }
}

/// A request's method together with its typed parameters
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Describe,
    Parameters,
    Complete(CompleteParams),
    Unknown(String),
}

impl GatewayCall {
    /// Decode method and params. Method names match exactly (case-sensitive).
    ///
    /// Params are ignored for `describe`, `parameters` and unknown methods.
    pub fn parse(method: &str, params: Option<Value>) -> Result<Self> {
        match method {
            "describe" => Ok(GatewayCall::Describe),
            "parameters" => Ok(GatewayCall::Parameters),
            "complete" => {
                let params = match params {
                    None | Some(Value::Null) => CompleteParams::default(),
                    Some(value @ Value::Object(_)) => serde_json::from_value(value)
                        .map_err(|e| GatewayError::InvalidParams(e.to_string()))?,
                    Some(_) => {
                        return Err(GatewayError::InvalidParams(
                            "params must be an object".to_string(),
                        ))
                    }
                };
                Ok(GatewayCall::Complete(params))
            }
            other => Ok(GatewayCall::Unknown(other.to_string())),
        }
    }
}

/// JSON-RPC error codes
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    /// Any failure of the remote completion call
    pub const SERVER_ERROR: i32 = -32000;
}
