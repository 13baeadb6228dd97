//! Collaborator traits for the MCP transport and protocol-session server.
//!
//! Both sides are opaque to the bridge: the transport consumes bridged
//! request/response pairs, the session server binds itself to a transport
//! once at connect time. Implementations live outside this crate.

use crate::request::BridgedRequest;
use crate::response::BridgedResponse;
use async_trait::async_trait;
use std::sync::Arc;

/// Wire-level MCP transport driven through the bridged interfaces.
///
/// `handle_request` owns the full response lifecycle: it must commit the
/// head (via `write_head` or `flush_headers`) and call `end`, or fail so
/// the caller can substitute an error response.
#[async_trait]
pub trait McpTransport: Send + Sync {
    async fn handle_request(
        &self,
        request: BridgedRequest,
        response: BridgedResponse,
        body: Option<serde_json::Value>,
    ) -> anyhow::Result<()>;
}

/// Protocol-session server bound to one transport at connect time.
#[async_trait]
pub trait SessionServer<T>: Send + Sync {
    async fn connect(&self, transport: Arc<T>) -> anyhow::Result<()>;
}
