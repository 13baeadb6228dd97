//! MCP Streamable HTTP front binary.
//!
//! Starts the demo MCP endpoint: the transport and protocol-session server
//! are created lazily on the first request and bound once per process; the
//! HTTP layer bridges every request onto them and streams the response body.
//!
//! # Environment Variables
//!
//! - `MCP_ADDR`: HTTP server bind address (default: 127.0.0.1:8000)
//! - `MCP_BASE_URL`: base URL override for proxy deployments (default:
//!   detected from the first request)
//! - `MCP_MAX_BODY_BYTES`: JSON body size limit in bytes (default: 2097152)
//! - `RUST_LOG`: log filter (default: info)

use anyhow::Result;
use dotenvy::dotenv;
use mcp_bridge::{new_session_id, SessionServer, TransportSession};
use mcp_http_front::demo::{DemoMcpServer, DemoTransport};
use mcp_http_front::server::http::boot_mcp_front_server;
use mcp_http_front::{AppState, HttpFrontConfig, MCP_ENDPOINT_PATH};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting MCP HTTP front (endpoint: {})", MCP_ENDPOINT_PATH);

    let config = HttpFrontConfig::from_env();
    let session = Arc::new(TransportSession::new(
        || Arc::new(DemoTransport::new(Arc::new(new_session_id))),
        |base_url: &str| {
            Arc::new(DemoMcpServer::new(base_url)) as Arc<dyn SessionServer<DemoTransport>>
        },
    ));

    boot_mcp_front_server(AppState { session, config }, None).await?;

    tracing::info!("MCP HTTP front shutdown");
    Ok(())
}
