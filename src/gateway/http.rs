use crate::config::Config;
use crate::error::{GatewayError, Result};
use crate::gateway::handler::Gateway;
use crate::gateway::types::*;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// HTTP transport around a [`Gateway`]
pub struct HttpGateway {
    gateway: Arc<Gateway>,
    issuer: String,
    allowed_origins: Vec<String>,
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    gateway: Arc<Gateway>,
    issuer: Arc<str>,
}

impl HttpGateway {
    /// Create a new HTTP gateway
    pub fn new(gateway: Gateway, config: &Config) -> Self {
        Self {
            gateway: Arc::new(gateway),
            issuer: config.gateway.issuer.clone(),
            allowed_origins: config.gateway.allowed_origins.clone(),
        }
    }

    /// Bind `addr` and serve until Ctrl-C
    pub async fn run(&self, addr: &str) -> Result<()> {
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            GatewayError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to bind to {}: {}. Set gateway.port in config.toml to use a different port.",
                    addr, e
                ),
            ))
        })?;

        log::info!("Listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                GatewayError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("HTTP server error: {}", e),
                ))
            })?;

        log::info!("Server shut down");
        Ok(())
    }

    /// Build the axum router
    pub fn router(&self) -> Router {
        // No origins configured: allow any (local dev)
        let cors = if self.allowed_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<axum::http::HeaderValue> = self
                .allowed_origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            // Prompts of any size must still get an enveloped 200
            .route("/", post(handle_rpc).layer(DefaultBodyLimit::disable()))
            .route(
                "/.well-known/oauth-authorization-server",
                get(handle_oauth_metadata),
            )
            .route("/register", post(handle_register))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(cors),
            )
            .with_state(AppState {
                gateway: Arc::clone(&self.gateway),
                issuer: Arc::from(self.issuer.as_str()),
            })
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Handle POST / (JSON-RPC envelope). The Authorization header is ignored.
///
/// Envelope-level errors answer 400; everything past envelope decoding answers 200.
async fn handle_rpc(State(state): State<AppState>, body: axum::body::Bytes) -> Response {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(JsonRpcResponse::error(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {}", e),
                )),
            )
                .into_response();
        }
    };

    let id = salvage_id(&value);

    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(r) => r,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_REQUEST,
                    format!("Invalid request: {}", e),
                )),
            )
                .into_response();
        }
    };

    let response = state.gateway.process_request(request).await;
    (StatusCode::OK, Json(response)).into_response()
}

/// Recover a string/integer id from an envelope that failed to decode
fn salvage_id(value: &Value) -> Value {
    value
        .get("id")
        .cloned()
        .and_then(|id| serde_json::from_value::<JsonRpcId>(id).ok())
        .map(Value::from)
        .unwrap_or(Value::Null)
}

/// Handle GET /.well-known/oauth-authorization-server (fixed metadata stub)
async fn handle_oauth_metadata(State(state): State<AppState>) -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "issuer": &*state.issuer })),
    )
        .into_response()
}

/// Handle POST /register (fixed registration stub, body ignored)
async fn handle_register() -> Response {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::handler::tests::MockBackend;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt;

    fn app(backend: MockBackend) -> Router {
        let config = Config::default();
        let gateway = Gateway::new(Arc::new(backend), &config.completion);
        HttpGateway::new(gateway, &config).router()
    }

    async fn post_json(app: Router, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("Content-Type", "application/json")
            .header("Authorization", "Bearer anything")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_complete_over_http() {
        let (status, body) = post_json(
            app(MockBackend::ok("hello")),
            r#"{"jsonrpc":"2.0","id":1,"method":"complete","params":{"prompt":"hi"}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"jsonrpc": "2.0", "id": 1, "result": {"completion": "hello"}})
        );
    }

    #[tokio::test]
    async fn test_large_prompt_is_not_rejected() {
        let prompt = "a".repeat(3 * 1024 * 1024);
        let body = json!({
            "jsonrpc": "2.0",
            "id": 11,
            "method": "complete",
            "params": {"prompt": prompt}
        })
        .to_string();
        let (status, body) = post_json(app(MockBackend::ok("done")), &body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"jsonrpc": "2.0", "id": 11, "result": {"completion": "done"}})
        );
    }

    #[tokio::test]
    async fn test_u64_id_is_echoed_over_http() {
        let (status, body) = post_json(
            app(MockBackend::ok("unused")),
            r#"{"jsonrpc":"2.0","id":18446744073709551615,"method":"describe"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"].as_u64(), Some(u64::MAX));
        assert_eq!(body["result"]["methods"], json!(["complete"]));
    }

    #[tokio::test]
    async fn test_remote_failure_is_still_200() {
        let (status, body) = post_json(
            app(MockBackend::failing("Network error: connection refused")),
            r#"{"jsonrpc":"2.0","id":"x","method":"complete","params":{}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "x");
        assert_eq!(body["error"]["code"], -32000);
        assert!(!body["error"]["message"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_method_is_200() {
        let (status, body) = post_json(
            app(MockBackend::ok("unused")),
            r#"{"jsonrpc":"2.0","id":2,"method":"foo","params":{}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"]["code"], -32601);
        assert_eq!(body["error"]["message"], "Method 'foo' not found");
    }

    #[tokio::test]
    async fn test_invalid_json_body() {
        let (status, body) = post_json(app(MockBackend::ok("unused")), "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["id"], Value::Null);
        assert_eq!(body["error"]["code"], -32700);
    }

    #[tokio::test]
    async fn test_invalid_envelope_echoes_id() {
        let (status, body) = post_json(
            app(MockBackend::ok("unused")),
            r#"{"jsonrpc":"2.0","id":"abc","params":{}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["id"], "abc");
        assert_eq!(body["error"]["code"], -32600);

        let (_, body) = post_json(
            app(MockBackend::ok("unused")),
            r#"{"jsonrpc":"2.0","id":1.5,"method":"describe"}"#,
        )
        .await;
        assert_eq!(body["id"], Value::Null);
        assert_eq!(body["error"]["code"], -32600);
    }

    #[tokio::test]
    async fn test_oauth_metadata_stub() {
        let request = Request::builder()
            .method("GET")
            .uri("/.well-known/oauth-authorization-server")
            .header("Authorization", "Bearer whatever")
            .body(Body::empty())
            .unwrap();
        let response = app(MockBackend::ok("unused")).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"issuer": "https://example.com"}));
    }

    #[tokio::test]
    async fn test_register_stub_ignores_body() {
        for body in ["", "garbage", r#"{"client_name":"tool"}"#] {
            let request = Request::builder()
                .method("POST")
                .uri("/register")
                .body(Body::from(body))
                .unwrap();
            let response = app(MockBackend::ok("unused")).oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body: Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body, json!({"status": "ok"}));
        }
    }
}
