//! WebSocket transport built on tokio-tungstenite.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::error::{Result, SocketError};
use crate::message::Payload;

use super::{BinaryType, EventSink, Transport, TransportEvent, TransportHandle};

/// Default transport: one tokio task per connection attempt, driving the
/// handshake, the read loop, and the outbound queue.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebSocketTransport;

enum Command {
    Send(Payload),
    Close,
}

#[derive(Debug)]
struct WsHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl TransportHandle for WsHandle {
    fn send(&self, payload: Payload) {
        let _ = self.tx.send(Command::Send(payload));
    }

    fn close(&self) {
        let _ = self.tx.send(Command::Close);
    }
}

impl Transport for WebSocketTransport {
    fn connect(
        &self,
        url: &str,
        binary_type: Option<BinaryType>,
        sink: EventSink,
    ) -> Result<Arc<dyn TransportHandle>> {
        if !url.starts_with("ws://") && !url.starts_with("wss://") {
            return Err(SocketError::transport(format!(
                "unsupported scheme in {url}"
            )));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_connection(url.to_owned(), binary_type, sink, rx));
        Ok(Arc::new(WsHandle { tx }))
    }
}

async fn run_connection(
    url: String,
    binary_type: Option<BinaryType>,
    sink: EventSink,
    mut rx: mpsc::UnboundedReceiver<Command>,
) {
    let stream = match connect_async(&url).await {
        Ok((stream, _)) => stream,
        Err(e) => {
            sink(TransportEvent::Error(e.to_string()));
            sink(TransportEvent::Close);
            return;
        }
    };

    sink(TransportEvent::Open);

    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            cmd = rx.recv() => match cmd {
                Some(Command::Send(payload)) => {
                    if let Err(e) = write.send(outbound(payload)).await {
                        sink(TransportEvent::Error(e.to_string()));
                        break;
                    }
                }
                Some(Command::Close) | None => {
                    let _ = write.send(Message::Close(None)).await;
                    break;
                }
            },
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    sink(TransportEvent::Message(Payload::Text(text)));
                }
                Some(Ok(Message::Binary(bytes))) => {
                    sink(TransportEvent::Message(inbound_binary(bytes, binary_type)));
                }
                Some(Ok(Message::Close(_))) | None => break,
                // Ping/pong control frames are answered by tungstenite itself.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    sink(TransportEvent::Error(e.to_string()));
                    break;
                }
            },
        }
    }

    sink(TransportEvent::Close);
}

fn outbound(payload: Payload) -> Message {
    match payload {
        Payload::Text(text) => Message::Text(text),
        Payload::Binary(bytes) => Message::Binary(bytes.to_vec()),
        Payload::Json(value) => Message::Text(value.to_string()),
    }
}

fn inbound_binary(bytes: Vec<u8>, binary_type: Option<BinaryType>) -> Payload {
    match binary_type {
        Some(BinaryType::Text) => Payload::Text(String::from_utf8_lossy(&bytes).into_owned()),
        _ => Payload::Binary(bytes.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use serde_json::json;

    #[tokio::test]
    async fn test_connect_rejects_non_socket_scheme() {
        let sink: EventSink = Arc::new(|_| {});
        let err = WebSocketTransport
            .connect("http://127.0.0.1:1/ws", None, sink)
            .unwrap_err();
        assert!(matches!(err, SocketError::Transport(_)));
    }

    #[tokio::test]
    async fn test_failed_handshake_reports_error_then_close() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink: EventSink = Arc::new(move |ev| {
            let _ = tx.send(ev);
        });

        // Nothing listens here; the handshake fails fast.
        let _handle = WebSocketTransport
            .connect("ws://127.0.0.1:9/", None, sink)
            .unwrap();

        let first = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
            .await
            .expect("timeout waiting for transport event")
            .expect("sink dropped");
        assert!(matches!(first, TransportEvent::Error(_)));

        let second = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
            .await
            .expect("timeout waiting for transport event")
            .expect("sink dropped");
        assert!(matches!(second, TransportEvent::Close));
    }

    #[test]
    fn test_outbound_encoding() {
        assert_eq!(
            outbound(Payload::Text("hi".into())),
            Message::Text("hi".into())
        );
        assert_eq!(
            outbound(Payload::Binary(Bytes::from_static(b"\x00\x01"))),
            Message::Binary(vec![0, 1])
        );
        assert_eq!(
            outbound(Payload::Json(json!({"a": 1}))),
            Message::Text("{\"a\":1}".into())
        );
    }

    #[test]
    fn test_inbound_binary_modes() {
        assert_eq!(
            inbound_binary(b"hi".to_vec(), None),
            Payload::Binary(Bytes::from_static(b"hi"))
        );
        assert_eq!(
            inbound_binary(b"hi".to_vec(), Some(BinaryType::Binary)),
            Payload::Binary(Bytes::from_static(b"hi"))
        );
        assert_eq!(
            inbound_binary(b"hi".to_vec(), Some(BinaryType::Text)),
            Payload::Text("hi".into())
        );
    }
}
