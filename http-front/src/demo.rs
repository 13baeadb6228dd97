//! Demo MCP collaborator: a stateless streamable-HTTP transport and the
//! protocol-session server it gets bound to.
//!
//! Implements just enough of the JSON-RPC surface to exercise the bridge
//! end to end: `initialize`, an `add` tool and a `greeting://{name}`
//! resource. Runs in stateless mode, so GET (SSE channel) and DELETE
//! (session termination) answer 405.

use anyhow::Result;
use async_trait::async_trait;
use http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use mcp_bridge::{BridgedRequest, BridgedResponse, McpTransport, SessionServer};
use once_cell::sync::OnceCell;
use serde_json::{json, Value};
use std::sync::Arc;

pub const SERVER_NAME: &str = "basic-mcp-server";
pub const SERVER_VERSION: &str = "1.0.0";
const PROTOCOL_VERSION: &str = "2025-03-26";

/// Generator for fresh per-session identifiers, injected at construction.
pub type SessionIdGenerator = Arc<dyn Fn() -> String + Send + Sync>;

struct RpcError {
    code: i64,
    message: String,
}

impl RpcError {
    fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Stateless demo transport. Holds the session server attached at connect
/// time and dispatches parsed JSON-RPC requests to it.
pub struct DemoTransport {
    session_id_generator: SessionIdGenerator,
    server: OnceCell<Arc<DemoMcpServer>>,
}

impl DemoTransport {
    pub fn new(session_id_generator: SessionIdGenerator) -> Self {
        Self {
            session_id_generator,
            server: OnceCell::new(),
        }
    }

    fn attach(&self, server: Arc<DemoMcpServer>) -> Result<()> {
        self.server
            .set(server)
            .map_err(|_| anyhow::anyhow!("session server already attached"))
    }

    fn handle_post(
        &self,
        server: &DemoMcpServer,
        response: &BridgedResponse,
        body: Option<Value>,
    ) {
        let Some(body) = body else {
            let payload = error_envelope(Value::Null, -32700, "Parse error");
            respond_json(response, StatusCode::BAD_REQUEST, HeaderMap::new(), &payload);
            return;
        };

        // notifications carry no id and get no body back
        if body.get("id").is_none() {
            response.write_head(StatusCode::ACCEPTED, HeaderMap::new());
            response.end();
            return;
        }

        let id = body.get("id").cloned().unwrap_or(Value::Null);
        let method = body.get("method").and_then(Value::as_str).unwrap_or_default();
        let params = body.get("params");

        let mut extra_headers = HeaderMap::new();
        let result = match method {
            "initialize" => {
                if let Ok(session_id) = HeaderValue::from_str(&(self.session_id_generator)()) {
                    extra_headers.insert(HeaderName::from_static("mcp-session-id"), session_id);
                }
                Ok(server.initialize())
            }
            "ping" => Ok(json!({})),
            "tools/list" => Ok(server.list_tools()),
            "tools/call" => server.call_tool(params),
            "resources/list" => Ok(json!({ "resources": [] })),
            "resources/templates/list" => Ok(server.list_resource_templates()),
            "resources/read" => server.read_resource(params),
            _ => Err(RpcError::new(-32601, "Method not found")),
        };

        let payload = match result {
            Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
            Err(err) => error_envelope(id, err.code, &err.message),
        };
        respond_json(response, StatusCode::OK, extra_headers, &payload);
    }
}

#[async_trait]
impl McpTransport for DemoTransport {
    async fn handle_request(
        &self,
        request: BridgedRequest,
        response: BridgedResponse,
        body: Option<Value>,
    ) -> Result<()> {
        let Some(server) = self.server.get() else {
            anyhow::bail!("transport not connected to a session server");
        };
        match request.method() {
            "POST" => self.handle_post(server, &response, body),
            _ => method_not_allowed(&response),
        }
        Ok(())
    }
}

/// Demo protocol-session server bound to one base URL.
#[derive(Clone)]
pub struct DemoMcpServer {
    base_url: String,
}

impl DemoMcpServer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {}, "resources": {}, "logging": {} },
            "serverInfo": { "name": SERVER_NAME, "version": SERVER_VERSION },
        })
    }

    fn list_tools(&self) -> Value {
        json!({
            "tools": [{
                "name": "add",
                "title": "Addition Tool",
                "description": "Add two numbers",
                "inputSchema": {
                    "type": "object",
                    "properties": { "a": { "type": "number" }, "b": { "type": "number" } },
                    "required": ["a", "b"],
                },
                "outputSchema": {
                    "type": "object",
                    "properties": { "result": { "type": "number" } },
                    "required": ["result"],
                },
            }]
        })
    }

    fn call_tool(&self, params: Option<&Value>) -> Result<Value, RpcError> {
        let name = params
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::new(-32602, "Missing tool name"))?;
        if name != "add" {
            return Err(RpcError::new(-32602, format!("Unknown tool: {}", name)));
        }

        let arguments = params.and_then(|p| p.get("arguments"));
        let a = arguments
            .and_then(|args| args.get("a"))
            .and_then(Value::as_f64)
            .ok_or_else(|| RpcError::new(-32602, "Missing numeric argument: a"))?;
        let b = arguments
            .and_then(|args| args.get("b"))
            .and_then(Value::as_f64)
            .ok_or_else(|| RpcError::new(-32602, "Missing numeric argument: b"))?;

        let output = json!({ "result": a + b });
        Ok(json!({
            "content": [
                { "type": "text", "text": output.to_string() },
                { "type": "text", "text": format!("Open UI: {}/app", self.base_url) },
            ],
            "structuredContent": output,
        }))
    }

    fn list_resource_templates(&self) -> Value {
        json!({
            "resourceTemplates": [{
                "uriTemplate": "greeting://{name}",
                "name": "greeting",
                "title": "Greeting Resource",
                "description": "Dynamic greeting generator",
            }]
        })
    }

    fn read_resource(&self, params: Option<&Value>) -> Result<Value, RpcError> {
        let uri = params
            .and_then(|p| p.get("uri"))
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::new(-32602, "Missing resource uri"))?;
        let name = uri
            .strip_prefix("greeting://")
            .filter(|name| !name.is_empty())
            .ok_or_else(|| RpcError::new(-32002, format!("Resource not found: {}", uri)))?;
        Ok(json!({
            "contents": [{ "uri": uri, "text": format!("Hello, {}!", name) }]
        }))
    }
}

#[async_trait]
impl SessionServer<DemoTransport> for DemoMcpServer {
    async fn connect(&self, transport: Arc<DemoTransport>) -> Result<()> {
        transport.attach(Arc::new(self.clone()))?;
        tracing::info!("demo MCP server connected (base_url={})", self.base_url);
        Ok(())
    }
}

fn error_envelope(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message },
    })
}

fn respond_json(
    response: &BridgedResponse,
    status: StatusCode,
    mut headers: HeaderMap,
    payload: &Value,
) {
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response.write_head(status, headers);
    response.end_with(payload.to_string());
}

fn method_not_allowed(response: &BridgedResponse) {
    let mut headers = HeaderMap::new();
    headers.insert(header::ALLOW, HeaderValue::from_static("POST"));
    let payload = error_envelope(Value::Null, -32000, "Method not allowed");
    respond_json(response, StatusCode::METHOD_NOT_ALLOWED, headers, &payload);
}
