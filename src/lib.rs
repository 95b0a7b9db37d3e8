//! Managed WebSocket connections with liveness probing and auto-reconnect.
//!
//! This crate manages the lifecycle of a single persistent, message-oriented
//! duplex connection: it establishes the connection, detects silently-dead
//! peers with a ping/pong exchange, recovers from failures, and fans out
//! connection and message events to registered listeners.
//!
//! # Features
//!
//! - Explicit four-state connection lifecycle
//! - Automatic reconnection at a fixed interval after unexpected closes
//! - Optional heartbeat probing with a forced close on a missed ack
//! - Ordered, panic-isolated event listeners per event kind
//! - Transport trait seam with a default `tokio-tungstenite` implementation
//! - Inbound JSON decoding with raw-text fallback
//!
//! # Example
//!
//! ```no_run
//! use wsconn_rs::{Event, ManagerConfig, SocketManager};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ManagerConfig::new("http://127.0.0.1:5000")
//!         .with_namespace("/ws")
//!         .with_heart_check(true);
//!
//!     let manager = SocketManager::new(config);
//!     manager
//!         .on_open(|_| println!("connected"))
//!         .on_message(|event| {
//!             if let Event::Message(payload) = event {
//!                 println!("got: {payload:?}");
//!             }
//!         });
//!
//!     manager.connect()?;
//!     manager.send("hello");
//!
//!     // ... later
//!     manager.disconnect();
//!     Ok(())
//! }
//! ```
//!
//! # Lifecycle Overview
//!
//! ```text
//! Disconnected --connect()--> Connecting --open event--> Open
//!      ^                          ^                       |
//!      |                     retry timer            close / error
//!      |                          |                       v
//!      +------disconnect()------ Closed <-----------------+
//! ```
//!
//! A manual `disconnect()` is the only path that suppresses automatic
//! reconnection; every other close re-arms the retry timer when reconnection
//! is enabled.

pub mod config;
pub mod error;
pub mod event;
pub mod manager;
pub mod message;
pub mod state;
pub mod transport;

mod heartbeat;
mod reconnect;

// Re-export commonly used types at the crate root
pub use config::{LivenessCallback, ManagerConfig};
pub use error::{Result, SocketError};
pub use event::{Event, EventCallback, EventDispatcher, EventKind};
pub use manager::SocketManager;
pub use message::{Payload, PING, PONG};
pub use state::{ConnectionState, ConnectionStats};
pub use transport::{
    BinaryType, EventSink, Transport, TransportEvent, TransportHandle, WebSocketTransport,
};
