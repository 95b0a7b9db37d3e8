//! The connection manager facade.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::config::ManagerConfig;
use crate::error::{Result, SocketError};
use crate::event::{self, Event, EventDispatcher, EventKind};
use crate::heartbeat::HeartbeatMonitor;
use crate::message::{self, Payload};
use crate::reconnect::ReconnectSupervisor;
use crate::state::{ConnectionState, ConnectionStats};
use crate::transport::{
    EventSink, Transport, TransportEvent, TransportHandle, WebSocketTransport,
};

/// A managed duplex-socket connection.
///
/// The manager persists across reconnect cycles; transport handles are
/// single-use and replaced on every attempt. Cloning is cheap and clones
/// share the same connection.
///
/// Must be used inside a tokio runtime: connecting and the supervisor timers
/// spawn tasks.
#[derive(Clone)]
pub struct SocketManager {
    shared: Arc<Shared>,
}

struct Shared {
    config: ManagerConfig,
    transport: Arc<dyn Transport>,
    inner: Mutex<Inner>,
}

struct Inner {
    state: ConnectionState,
    handle: Option<Arc<dyn TransportHandle>>,
    /// Connection generation; events stamped with an older value are from a
    /// replaced transport and are dropped.
    epoch: u64,
    /// Set by `disconnect()`, cleared by `connect()`. Distinguishes a manual
    /// close from a connection that merely failed.
    manually_closed: bool,
    dispatcher: EventDispatcher,
    heartbeat: HeartbeatMonitor,
    reconnect: ReconnectSupervisor,
    stats: ConnectionStats,
}

impl SocketManager {
    /// Create a manager using the default WebSocket transport.
    pub fn new(config: ManagerConfig) -> Self {
        Self::with_transport(config, Arc::new(WebSocketTransport))
    }

    /// Create a manager over a custom transport.
    pub fn with_transport(config: ManagerConfig, transport: Arc<dyn Transport>) -> Self {
        let mut dispatcher = EventDispatcher::new();
        for (kind, cb) in [
            (EventKind::Open, config.on_open.clone()),
            (EventKind::Close, config.on_close.clone()),
            (EventKind::Error, config.on_error.clone()),
            (EventKind::Message, config.on_message.clone()),
        ] {
            if let Some(cb) = cb {
                dispatcher.register(kind, cb);
            }
        }

        let heartbeat = HeartbeatMonitor::new(
            config.heart_check_timeout,
            config.server_timeout,
            config.heart_check_cb.clone(),
        );
        let reconnect = ReconnectSupervisor::new(config.reconnect_time);

        Self {
            shared: Arc::new(Shared {
                config,
                transport,
                inner: Mutex::new(Inner {
                    state: ConnectionState::Disconnected,
                    handle: None,
                    epoch: 0,
                    manually_closed: false,
                    dispatcher,
                    heartbeat,
                    reconnect,
                    stats: ConnectionStats::default(),
                }),
            }),
        }
    }

    /// Connect using the configured namespace.
    ///
    /// A no-op returning the existing handle while the connection is open or
    /// still opening.
    pub fn connect(&self) -> Result<Arc<dyn TransportHandle>> {
        let namespace = self.shared.config.namespace.clone();
        self.connect_to(&namespace)
    }

    /// Connect to a specific namespace under the configured base address.
    pub fn connect_to(&self, namespace: &str) -> Result<Arc<dyn TransportHandle>> {
        let url = self.shared.config.target_url(namespace)?;

        let mut inner = self.shared.inner.lock().unwrap();
        if inner.state.is_active() {
            if let Some(handle) = &inner.handle {
                return Ok(Arc::clone(handle));
            }
        }

        inner.epoch += 1;
        let sink = self.event_sink(inner.epoch);
        let handle =
            self.shared
                .transport
                .connect(&url, self.shared.config.binary_type, sink)?;

        tracing::debug!(%url, epoch = inner.epoch, "connection attempt started");
        inner.handle = Some(Arc::clone(&handle));
        inner.state = ConnectionState::Connecting;
        inner.manually_closed = false;
        Ok(handle)
    }

    /// Close the connection and suppress automatic reconnection until the
    /// next `connect()`.
    pub fn disconnect(&self) {
        let mut inner = self.shared.inner.lock().unwrap();
        inner.reconnect.cancel();
        inner.heartbeat.stop();
        if let Some(handle) = inner.handle.take() {
            handle.close();
            inner.stats.record_disconnect();
        }
        inner.manually_closed = true;
        inner.state = ConnectionState::Disconnected;
        tracing::debug!("manually disconnected");
    }

    /// Alias of [`disconnect`](Self::disconnect).
    pub fn close(&self) {
        self.disconnect();
    }

    /// Re-establish the connection after an unexpected close.
    ///
    /// # Errors
    ///
    /// Fails without retrying when the connection was manually closed, or
    /// when no connection was ever established.
    pub fn reconnect(&self) -> Result<Arc<dyn TransportHandle>> {
        {
            let mut inner = self.shared.inner.lock().unwrap();
            if inner.manually_closed {
                tracing::warn!("reconnect refused: connection was manually closed");
                inner.reconnect.cancel();
                return Err(SocketError::ManuallyClosed);
            }
            if inner.handle.is_none() {
                tracing::warn!("reconnect refused: never connected");
                inner.reconnect.cancel();
                return Err(SocketError::NotConnected);
            }
            inner.stats.record_reconnect();
        }
        self.connect()
    }

    /// Forward a payload to the transport. Silently dropped when no
    /// transport is present.
    pub fn send(&self, data: impl Into<Payload>) {
        let mut inner = self.shared.inner.lock().unwrap();
        match inner.handle.clone() {
            Some(handle) => {
                handle.send(data.into());
                inner.stats.record_send();
            }
            None => tracing::trace!("send with no transport; dropped"),
        }
    }

    /// Append a listener for `kind`.
    pub fn add_listener(
        &self,
        kind: EventKind,
        cb: impl Fn(&Event) + Send + Sync + 'static,
    ) -> &Self {
        self.shared
            .inner
            .lock()
            .unwrap()
            .dispatcher
            .register(kind, Arc::new(cb));
        self
    }

    /// Append an open listener.
    pub fn on_open(&self, cb: impl Fn(&Event) + Send + Sync + 'static) -> &Self {
        self.add_listener(EventKind::Open, cb)
    }

    /// Append a close listener.
    pub fn on_close(&self, cb: impl Fn(&Event) + Send + Sync + 'static) -> &Self {
        self.add_listener(EventKind::Close, cb)
    }

    /// Append an error listener.
    pub fn on_error(&self, cb: impl Fn(&Event) + Send + Sync + 'static) -> &Self {
        self.add_listener(EventKind::Error, cb)
    }

    /// Append a message listener.
    pub fn on_message(&self, cb: impl Fn(&Event) + Send + Sync + 'static) -> &Self {
        self.add_listener(EventKind::Message, cb)
    }

    /// Get the current connection state.
    pub fn state(&self) -> ConnectionState {
        self.shared.inner.lock().unwrap().state
    }

    /// Get the current transport handle, if any.
    pub fn handle(&self) -> Option<Arc<dyn TransportHandle>> {
        self.shared.inner.lock().unwrap().handle.clone()
    }

    /// Get connection statistics.
    pub fn stats(&self) -> ConnectionStats {
        self.shared.inner.lock().unwrap().stats.clone()
    }

    /// Build the event bridge for one connection attempt.
    fn event_sink(&self, epoch: u64) -> EventSink {
        let weak = Arc::downgrade(&self.shared);
        Arc::new(move |event| {
            if let Some(shared) = weak.upgrade() {
                SocketManager { shared }.handle_transport_event(epoch, event);
            }
        })
    }

    /// Build the closure the reconnect supervisor invokes on each tick.
    fn retry_fn(&self) -> impl Fn() + Send + Sync + 'static {
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        move || {
            if let Some(shared) = weak.upgrade() {
                let manager = SocketManager { shared };
                if let Err(err) = manager.reconnect() {
                    tracing::warn!(%err, "scheduled reconnect attempt failed");
                }
            }
        }
    }

    fn handle_transport_event(&self, epoch: u64, event: TransportEvent) {
        let inner = self.shared.inner.lock().unwrap();
        if epoch != inner.epoch {
            tracing::trace!(epoch, current = inner.epoch, "event from replaced transport; dropped");
            return;
        }
        match event {
            TransportEvent::Open => self.on_transport_open(inner),
            TransportEvent::Close => self.on_transport_closed(inner, None),
            TransportEvent::Error(reason) => self.on_transport_closed(inner, Some(reason)),
            TransportEvent::Message(payload) => self.on_transport_message(inner, payload),
        }
    }

    fn on_transport_open(&self, mut inner: MutexGuard<'_, Inner>) {
        tracing::debug!("connection open");
        inner.state = ConnectionState::Open;
        inner.stats.record_connect();
        inner.reconnect.cancel();
        if self.shared.config.need_heart_check {
            if let Some(handle) = inner.handle.clone() {
                inner.heartbeat.start(handle);
            }
        }

        let callbacks = inner.dispatcher.snapshot(EventKind::Open);
        drop(inner);
        event::deliver(&callbacks, &Event::Open);
    }

    fn on_transport_closed(&self, mut inner: MutexGuard<'_, Inner>, reason: Option<String>) {
        inner.heartbeat.stop();
        if !inner.manually_closed {
            inner.state = ConnectionState::Closed;
            inner.stats.record_disconnect();
            if self.shared.config.is_reconnect {
                let retry = self.retry_fn();
                inner.reconnect.schedule_if_absent(retry);
            }
        }

        let (kind, event) = match reason {
            Some(reason) => {
                tracing::debug!(%reason, "transport error");
                (EventKind::Error, Event::Error(reason))
            }
            None => {
                tracing::debug!("connection closed");
                (EventKind::Close, Event::Close)
            }
        };
        let callbacks = inner.dispatcher.snapshot(kind);
        drop(inner);
        event::deliver(&callbacks, &event);
    }

    fn on_transport_message(&self, mut inner: MutexGuard<'_, Inner>, payload: Payload) {
        inner.stats.record_receive();
        match message::decode_incoming(payload) {
            message::Incoming::Ack => {
                tracing::trace!("liveness ack received");
                if self.shared.config.need_heart_check {
                    if let Some(handle) = inner.handle.clone() {
                        inner.heartbeat.reset(handle);
                    }
                }
            }
            message::Incoming::Deliver(payload) => {
                let callbacks = inner.dispatcher.snapshot(EventKind::Message);
                drop(inner);
                event::deliver(&callbacks, &Event::Message(payload));
            }
        }
    }
}

impl fmt::Debug for SocketManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.inner.lock().unwrap();
        f.debug_struct("SocketManager")
            .field("base_url", &self.shared.config.base_url)
            .field("state", &inner.state)
            .field("manually_closed", &inner.manually_closed)
            .finish()
    }
}
