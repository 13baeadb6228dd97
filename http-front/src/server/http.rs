//! HTTP front for the MCP streamable endpoint.
//!
//! Each MCP verb handler bridges the axum request onto the legacy transport
//! interface: the transport is invoked on a detached task, the handler
//! awaits only the head-ready signal and returns a streaming response whose
//! body is the live byte channel the transport keeps writing into. CORS
//! headers are decorated onto the committed head per request; OPTIONS is
//! answered synchronously without touching the transport.

use crate::config::HttpFrontConfig;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{Html, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures::StreamExt;
use mcp_bridge::{BridgedRequest, BridgedResponse, McpTransport, TransportSession};
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::wrappers::UnboundedReceiverStream;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>MCP HTTP Front</title></head>
<body>
    <h1>MCP HTTP Front</h1>
    <p>MCP endpoint: <code>POST /api/mcp</code></p>
    <p>UI page: <code>GET /app</code></p>
    <p>Health check: <code>GET /api/health</code></p>
</body>
</html>"#;

const APP_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Hello World</title></head>
<body>
    <h1>Hello World</h1>
    <button onclick="alert('Button clicked!')">Click Me</button>
</body>
</html>"#;

const ALLOW_METHODS: &str = "GET,POST,DELETE,OPTIONS";
const DEFAULT_ALLOW_HEADERS: &str = "Content-Type, Accept, Mcp-Session-Id, Mcp-Protocol-Version";
const EXPOSED_HEADERS: &str = "Mcp-Session-Id, Mcp-Protocol-Version";

/// Application state for axum handlers.
pub struct AppState<T>
where
    T: McpTransport + 'static,
{
    pub session: Arc<TransportSession<T>>,
    pub config: HttpFrontConfig,
}

/// Boot the MCP HTTP front server.
///
/// # Arguments
/// * `state` - transport session and configuration
/// * `shutdown_signal` - Optional external shutdown signal. If None, uses an
///   internal ctrl_c handler.
pub async fn boot_mcp_front_server<T>(
    state: AppState<T>,
    shutdown_signal: Option<Pin<Box<dyn Future<Output = ()> + Send>>>,
) -> anyhow::Result<()>
where
    T: McpTransport + 'static,
{
    let bind_addr = state.config.bind_addr.clone();
    let app = build_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("MCP HTTP front started on {}", bind_addr);

    // Use provided shutdown signal or create internal one
    let shutdown_future: Pin<Box<dyn Future<Output = ()> + Send>> = match shutdown_signal {
        Some(signal) => signal,
        None => {
            let (tx, rx) = tokio::sync::oneshot::channel::<()>();
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        tracing::info!("Shutting down MCP HTTP front...");
                        let _ = tx.send(());
                    }
                    Err(e) => tracing::error!("failed to listen for ctrl_c: {:?}", e),
                }
            });
            Box::pin(async move {
                rx.await.ok();
            })
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_future)
        .await?;

    Ok(())
}

/// Build the front router. Exposed so tests can drive it in-process.
pub fn build_router<T>(state: Arc<AppState<T>>) -> Router
where
    T: McpTransport + 'static,
{
    let api_routes = Router::new()
        .route("/health", get(health_handler))
        .route(
            "/mcp",
            get(mcp_handler::<T>)
                .post(mcp_handler::<T>)
                .delete(mcp_handler::<T>)
                .options(preflight_handler),
        );

    Router::new()
        .route("/", get(index_handler))
        .route("/app", get(app_page_handler))
        .nest("/api", api_routes)
        .with_state(state)
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn app_page_handler() -> Html<&'static str> {
    Html(APP_HTML)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": crate::APP_NAME
    }))
}

/// Shared handler for the MCP verbs (GET/POST/DELETE).
async fn mcp_handler<T>(State(state): State<Arc<AppState<T>>>, req: Request) -> Response
where
    T: McpTransport + 'static,
{
    let origin = req.headers().get(header::ORIGIN).cloned();

    let base_url = state
        .config
        .base_url
        .clone()
        .unwrap_or_else(|| detect_base_url(&req));
    let transport = match state.session.ensure_connected(&base_url).await {
        Ok(transport) => transport,
        Err(e) => {
            tracing::error!("session initialization failed: {:?}", e);
            return internal_error_response(origin.as_ref(), &e.to_string());
        }
    };

    let bridged_request = BridgedRequest::new(req.method(), req.headers());
    let parsed_body = if req.method() == Method::POST {
        parse_body_safe(req, state.config.max_body_bytes).await
    } else {
        None
    };

    let (bridged_response, mut receiver) = BridgedResponse::channel();

    // Invoked without awaiting completion; only the head is awaited below.
    // Failures before head commit become a 500 through the same bridge,
    // failures after it can only be logged.
    tokio::spawn(async move {
        if let Err(err) = transport
            .handle_request(bridged_request, bridged_response.clone(), parsed_body)
            .await
        {
            if bridged_response.head_committed() {
                tracing::error!("transport failed after head commit: {:?}", err);
            } else {
                tracing::warn!("transport failed, substituting 500: {:?}", err);
                let mut headers = HeaderMap::new();
                headers.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                bridged_response.write_head(StatusCode::INTERNAL_SERVER_ERROR, headers);
                bridged_response.end_with(internal_error_body(&err.to_string()));
            }
        }
    });

    let head = match receiver.recv_head().await {
        Ok(head) => head,
        Err(e) => {
            tracing::error!("transport dropped the response before head commit: {:?}", e);
            return internal_error_response(origin.as_ref(), &e.to_string());
        }
    };

    let body_stream = UnboundedReceiverStream::new(receiver.body).map(Ok::<_, Infallible>);
    let mut response = Response::new(Body::from_stream(body_stream));
    *response.status_mut() = head.status;
    *response.headers_mut() = head.headers;
    apply_cors(response.headers_mut(), origin.as_ref());
    response
}

/// CORS preflight; no transport interaction.
async fn preflight_handler(headers: HeaderMap) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NO_CONTENT;

    let response_headers = response.headers_mut();
    apply_cors(response_headers, headers.get(header::ORIGIN));
    response_headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    let requested = headers
        .get(header::ACCESS_CONTROL_REQUEST_HEADERS)
        .filter(|v| !v.to_str().unwrap_or("").trim().is_empty());
    response_headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        requested
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_ALLOW_HEADERS)),
    );
    response
}

/// CORS for browser-based MCP clients/Inspector.
fn apply_cors(headers: &mut HeaderMap, origin: Option<&HeaderValue>) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        origin.cloned().unwrap_or_else(|| HeaderValue::from_static("*")),
    );
    headers.insert(header::VARY, HeaderValue::from_static("Origin"));
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static(EXPOSED_HEADERS),
    );
}

/// Best-effort JSON body parse: only when the content type says JSON, and
/// parse failures are treated as no body.
async fn parse_body_safe(req: Request, max_body_bytes: usize) -> Option<serde_json::Value> {
    let is_json = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.contains("application/json"))
        .unwrap_or(false);
    if !is_json {
        return None;
    }
    let bytes = axum::body::to_bytes(req.into_body(), max_body_bytes)
        .await
        .ok()?;
    serde_json::from_slice(&bytes).ok()
}

fn detect_base_url(req: &Request) -> String {
    let scheme = req
        .headers()
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| req.uri().authority().map(|authority| authority.as_str()))
        .unwrap_or("localhost");
    format!("{}://{}", scheme, host)
}

fn internal_error_body(detail: &str) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "error": {
            "code": -32000,
            "message": "Internal Server Error",
            "data": detail,
        },
        "id": null,
    })
    .to_string()
}

fn internal_error_response(origin: Option<&HeaderValue>, detail: &str) -> Response {
    let mut response = Response::new(Body::from(internal_error_body(detail)));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    apply_cors(response.headers_mut(), origin);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_error_body_shape() {
        let body: serde_json::Value =
            serde_json::from_str(&internal_error_body("boom")).unwrap();
        assert_eq!(body["jsonrpc"], "2.0");
        assert_eq!(body["error"]["code"], -32000);
        assert_eq!(body["error"]["message"], "Internal Server Error");
        assert_eq!(body["error"]["data"], "boom");
        assert!(body["id"].is_null());
    }

    #[test]
    fn test_detect_base_url_from_headers() {
        let req = http::Request::builder()
            .uri("/api/mcp")
            .header(header::HOST, "mcp.example.com:8443")
            .header("x-forwarded-proto", "https")
            .body(Body::empty())
            .unwrap();
        assert_eq!(detect_base_url(&req), "https://mcp.example.com:8443");
    }

    #[test]
    fn test_detect_base_url_defaults() {
        let req = http::Request::builder()
            .uri("/api/mcp")
            .body(Body::empty())
            .unwrap();
        assert_eq!(detect_base_url(&req), "http://localhost");
    }
}
