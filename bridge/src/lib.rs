//! Bridging layer between a fetch-style HTTP framework and a legacy
//! streaming-response transport interface.
//!
//! MCP streamable-HTTP transports were designed against a socket-style
//! response object: write the head once, stream body chunks, close
//! explicitly. Modern HTTP frameworks instead hand out an immutable request
//! and expect a response value with a readable body. This crate adapts the
//! two shapes to each other:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    HTTP framework (axum)                 │
//! │   Request ──► BridgedRequest      Response ◄── head +    │
//! │                    │                           body      │
//! └────────────────────┼────────────────────────────▲────────┘
//!                      │                            │
//! ┌────────────────────▼────────────────────────────┼────────┐
//! │                    mcp-bridge crate             │        │
//! │  BridgedResponse (write_head / write / end) ────┘        │
//! │    - head commit → oneshot ResponseHead signal           │
//! │    - body chunks → unbounded byte channel                │
//! │    - end        → channel close + cancellation token     │
//! │  TransportSession (lazy create → connect, once only)     │
//! └────────────────────┬─────────────────────────────────────┘
//!                      │ McpTransport::handle_request
//! ┌────────────────────▼─────────────────────────────────────┐
//! │        transport / protocol-session server (opaque)      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The caller awaits only the head-ready signal and returns a streaming
//! response; the transport keeps writing into the byte channel from a
//! detached task until it calls `end`.
//!
//! # Modules
//!
//! - `request`: immutable method + lower-cased header snapshot
//! - `response`: legacy streaming response facade over channel primitives
//! - `session`: once-per-process transport creation and server binding
//! - `transport`: collaborator traits (`McpTransport`, `SessionServer`)
//! - `error`: bridge error types

pub mod error;
pub mod request;
pub mod response;
pub mod session;
pub mod transport;

pub use error::BridgeError;
pub use request::BridgedRequest;
pub use response::{BridgedResponse, ResponseHead, ResponseReceiver};
pub use session::{new_session_id, ServerBinding, TransportSession};
pub use transport::{McpTransport, SessionServer};
