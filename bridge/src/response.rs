//! Legacy streaming response facade.
//!
//! `BridgedResponse` presents the imperative contract a streamable-HTTP
//! transport expects (write the head once, push body chunks, close
//! explicitly) while feeding everything into channel primitives the HTTP
//! framework can consume: a oneshot carrying the committed head and an
//! unbounded byte channel whose receiver half becomes the response body.
//!
//! The head commits at most once. `write_head` takes effect only on the
//! first call; `flush_headers` commits with whatever status/headers are
//! current. Writes before the commit are legal - ordering is the
//! transport's obligation, the bridge only enforces commit idempotence.

use crate::error::BridgeError;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, StatusCode};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// Status and headers fixed at head-commit time.
#[derive(Debug)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

struct HeadState {
    status: StatusCode,
    headers: HeaderMap,
    committed: bool,
    head_tx: Option<oneshot::Sender<ResponseHead>>,
}

struct Shared {
    head: Mutex<HeadState>,
    // taken on `end`; a closed slot makes later writes report failure
    body_tx: Mutex<Option<mpsc::UnboundedSender<Bytes>>>,
    closed: CancellationToken,
}

/// Producer half of the bridge, handed to the transport. Cheap to clone;
/// all clones share one head and one byte sink.
#[derive(Clone)]
pub struct BridgedResponse {
    shared: Arc<Shared>,
}

/// Consumer half kept by the HTTP handler.
pub struct ResponseReceiver {
    /// Resolves exactly once with the committed head.
    pub head: oneshot::Receiver<ResponseHead>,
    /// Byte stream fed by `write`/`end` on the producer side.
    pub body: mpsc::UnboundedReceiver<Bytes>,
}

impl BridgedResponse {
    /// Create a connected producer/consumer pair for one request.
    pub fn channel() -> (Self, ResponseReceiver) {
        let (head_tx, head_rx) = oneshot::channel();
        let (body_tx, body_rx) = mpsc::unbounded_channel();
        let res = Self {
            shared: Arc::new(Shared {
                head: Mutex::new(HeadState {
                    status: StatusCode::OK,
                    headers: HeaderMap::new(),
                    committed: false,
                    head_tx: Some(head_tx),
                }),
                body_tx: Mutex::new(Some(body_tx)),
                closed: CancellationToken::new(),
            }),
        };
        (
            res,
            ResponseReceiver {
                head: head_rx,
                body: body_rx,
            },
        )
    }

    /// Set status and merge headers, first call only. Later calls are
    /// no-ops. Returns `&Self` so `flush_headers` can be chained.
    pub fn write_head(&self, status: StatusCode, headers: HeaderMap) -> &Self {
        let mut head = lock(&self.shared.head);
        if !head.committed {
            head.status = status;
            merge_headers(&mut head.headers, headers);
            commit(&mut head);
        }
        self
    }

    /// Commit the head with the current status/headers if not yet committed.
    pub fn flush_headers(&self) {
        let mut head = lock(&self.shared.head);
        if !head.committed {
            commit(&mut head);
        }
    }

    /// Push a chunk into the body sink. Never blocks; returns whether the
    /// chunk was accepted (false once `end` was called or the consumer is
    /// gone).
    pub fn write(&self, chunk: impl Into<Bytes>) -> bool {
        match lock(&self.shared.body_tx).as_ref() {
            Some(tx) => tx.send(chunk.into()).is_ok(),
            None => false,
        }
    }

    /// Close the body sink and fire the close notification. A second call
    /// is a no-op.
    pub fn end(&self) {
        self.finish(None);
    }

    /// Write a final chunk, then close as `end` does.
    pub fn end_with(&self, chunk: impl Into<Bytes>) {
        self.finish(Some(chunk.into()));
    }

    /// Whether the head has been committed. Once true, status and headers
    /// are frozen and an error response can no longer be substituted.
    pub fn head_committed(&self) -> bool {
        lock(&self.shared.head).committed
    }

    /// Token cancelled exactly once when `end` closes the sink.
    pub fn close_token(&self) -> CancellationToken {
        self.shared.closed.clone()
    }

    fn finish(&self, chunk: Option<Bytes>) {
        let mut slot = lock(&self.shared.body_tx);
        if let Some(tx) = slot.take() {
            if let Some(chunk) = chunk {
                let _ = tx.send(chunk);
            }
            drop(tx);
            self.shared.closed.cancel();
        }
    }
}

impl ResponseReceiver {
    /// Wait for the committed head. A producer dropped without committing
    /// is reported as `HeadDropped` so the caller can synthesize an error
    /// response instead of hanging.
    pub async fn recv_head(&mut self) -> Result<ResponseHead, BridgeError> {
        (&mut self.head)
            .await
            .map_err(|_| BridgeError::HeadDropped("response dropped before head commit".to_string()))
    }
}

fn commit(head: &mut HeadState) {
    head.committed = true;
    if let Some(tx) = head.head_tx.take() {
        let _ = tx.send(ResponseHead {
            status: head.status,
            headers: head.headers.clone(),
        });
    }
}

// Replace-on-set semantics per name, preserving repeated values within `src`.
fn merge_headers(dst: &mut HeaderMap, src: HeaderMap) {
    let mut last: Option<HeaderName> = None;
    for (name, value) in src {
        if let Some(name) = name {
            dst.remove(&name);
            last = Some(name);
        }
        if let Some(name) = &last {
            dst.append(name.clone(), value);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
