//! MCP Streamable HTTP front server.
//!
//! Serves a single demo MCP endpoint over streamable HTTP by bridging axum
//! requests onto the legacy transport interface from `mcp-bridge`, plus a
//! trivial UI page and a health probe.
//!
//! # Modules
//!
//! - `config`: server configuration (bind address, base-URL override, limits)
//! - `demo`: demo MCP collaborator (add tool, greeting resource)
//! - `server`: axum router, MCP verb handlers, CORS and boot
//!
//! # Environment Variables
//!
//! - `MCP_ADDR`: HTTP server bind address (default: 127.0.0.1:8000)
//! - `MCP_BASE_URL`: base URL override for proxy deployments (default: unset,
//!   detected from the first request)
//! - `MCP_MAX_BODY_BYTES`: JSON body size limit in bytes (default: 2097152)

pub mod config;
pub mod demo;
pub mod server;

pub use config::HttpFrontConfig;
pub use server::http::{boot_mcp_front_server, AppState};

pub static APP_NAME: &str = "mcp-http-front";

/// Path the MCP verb handlers are mounted under.
pub static MCP_ENDPOINT_PATH: &str = "/api/mcp";
