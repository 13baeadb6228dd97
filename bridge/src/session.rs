//! Once-per-process transport/session state.
//!
//! Mirrors the lazy lifecycle of a streamable-HTTP deployment: the first
//! request constructs the transport, the first connecting request binds a
//! protocol-session server to it under the base URL detected from that
//! request. Both transitions happen at most once for the process lifetime;
//! there is no reset. The state is an injected dependency (held in the HTTP
//! application state), and both check-then-act transitions are guarded by
//! async once-cells so concurrent first requests cannot double-initialize.

use crate::error::BridgeError;
use crate::transport::{McpTransport, SessionServer};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Fresh random identifier for one protocol session.
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Base URL captured when the session server connected.
#[derive(Debug, Clone)]
pub struct ServerBinding {
    pub base_url: String,
}

type TransportFactory<T> = Box<dyn Fn() -> Arc<T> + Send + Sync>;
type ServerFactory<T> = Box<dyn Fn(&str) -> Arc<dyn SessionServer<T>> + Send + Sync>;

/// Lazily-initialized transport plus its server binding.
///
/// State machine: `UNINITIALIZED -> TRANSPORT_CREATED -> CONNECTED`. The
/// base URL of the first request that completes the connect transition is
/// kept for the rest of the process, even if later requests arrive under a
/// different origin.
pub struct TransportSession<T>
where
    T: McpTransport + 'static,
{
    transport_factory: TransportFactory<T>,
    server_factory: ServerFactory<T>,
    transport: OnceCell<Arc<T>>,
    binding: OnceCell<ServerBinding>,
}

impl<T> TransportSession<T>
where
    T: McpTransport + 'static,
{
    pub fn new(
        transport_factory: impl Fn() -> Arc<T> + Send + Sync + 'static,
        server_factory: impl Fn(&str) -> Arc<dyn SessionServer<T>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            transport_factory: Box::new(transport_factory),
            server_factory: Box::new(server_factory),
            transport: OnceCell::new(),
            binding: OnceCell::new(),
        }
    }

    /// Drive the lazy transitions as far as needed and return the connected
    /// transport. A failed connect leaves the binding unset, so a later
    /// request retries it.
    pub async fn ensure_connected(&self, base_url: &str) -> Result<Arc<T>, BridgeError> {
        let transport = self
            .transport
            .get_or_init(|| async { (self.transport_factory)() })
            .await
            .clone();

        self.binding
            .get_or_try_init(|| async {
                let server = (self.server_factory)(base_url);
                server.connect(transport.clone()).await?;
                tracing::info!("MCP session server connected (base_url={})", base_url);
                Ok::<_, anyhow::Error>(ServerBinding {
                    base_url: base_url.to_string(),
                })
            })
            .await
            .map_err(BridgeError::ConnectError)?;

        Ok(transport)
    }

    pub fn is_connected(&self) -> bool {
        self.binding.initialized()
    }

    /// Base URL the server was bound to, once connected.
    pub fn base_url(&self) -> Option<&str> {
        self.binding.get().map(|binding| binding.base_url.as_str())
    }
}
