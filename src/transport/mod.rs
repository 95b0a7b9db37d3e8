//! Transport seam for connection management.
//!
//! The manager never talks to a socket directly; it creates handles through
//! the [`Transport`] factory and receives [`TransportEvent`]s through the sink
//! it registers at creation time. The default implementation is
//! [`WebSocketTransport`], built on `tokio-tungstenite`.
//!
//! Implementations MUST deliver events asynchronously: never invoke the sink
//! from inside `connect`, `send`, or `close`, or the caller may deadlock.

mod websocket;

pub use websocket::WebSocketTransport;

use std::sync::Arc;

use crate::error::Result;
use crate::message::Payload;

/// How a transport surfaces binary frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryType {
    /// Deliver binary frames as raw bytes.
    Binary,
    /// Lossily decode binary frames to UTF-8 text.
    Text,
}

/// An event emitted by a transport handle.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// The connection is established and ready.
    Open,
    /// The connection is gone. Emitted exactly once per handle, last.
    Close,
    /// The connection attempt or an established connection failed.
    Error(String),
    /// A frame arrived.
    Message(Payload),
}

/// Callback a transport invokes to deliver events.
pub type EventSink = Arc<dyn Fn(TransportEvent) + Send + Sync>;

/// Factory for transport handles.
pub trait Transport: Send + Sync {
    /// Begin a connection attempt to `url`.
    ///
    /// Returns a handle immediately; the outcome arrives through `sink`
    /// (`Open` on success, `Error` followed by `Close` on failure).
    ///
    /// # Errors
    ///
    /// Returns an error only if the attempt cannot even be started.
    fn connect(
        &self,
        url: &str,
        binary_type: Option<BinaryType>,
        sink: EventSink,
    ) -> Result<Arc<dyn TransportHandle>>;
}

/// One live connection attempt. Single-use: a handle is never reconnected,
/// only replaced.
pub trait TransportHandle: std::fmt::Debug + Send + Sync {
    /// Queue a payload for sending. Silently dropped if the connection is
    /// gone.
    fn send(&self, payload: Payload);

    /// Request an orderly close. The transport emits `Close` once done.
    fn close(&self);
}
