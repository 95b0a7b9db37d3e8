//! Event kinds, payloads, and the listener dispatcher.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::message::Payload;

/// Classification of dispatchable events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The connection opened.
    Open,
    /// The connection closed.
    Close,
    /// The transport reported an error.
    Error,
    /// An application message arrived.
    Message,
}

impl EventKind {
    /// All event kinds, in a fixed order.
    pub const ALL: [EventKind; 4] = [
        EventKind::Open,
        EventKind::Close,
        EventKind::Error,
        EventKind::Message,
    ];
}

/// A dispatched event.
#[derive(Debug, Clone)]
pub enum Event {
    /// The connection opened.
    Open,
    /// The connection closed.
    Close,
    /// The transport reported an error.
    Error(String),
    /// An application message arrived.
    Message(Payload),
}

impl Event {
    /// The kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Open => EventKind::Open,
            Event::Close => EventKind::Close,
            Event::Error(_) => EventKind::Error,
            Event::Message(_) => EventKind::Message,
        }
    }
}

/// A registered event listener.
pub type EventCallback = Arc<dyn Fn(&Event) + Send + Sync>;

/// Ordered listener lists per event kind.
///
/// Insertion order defines invocation order; listeners are never deduplicated.
/// All four kinds are present from construction.
pub struct EventDispatcher {
    listeners: HashMap<EventKind, Vec<EventCallback>>,
}

impl EventDispatcher {
    /// Create a dispatcher with an empty listener list for every kind.
    pub fn new() -> Self {
        let mut listeners = HashMap::with_capacity(EventKind::ALL.len());
        for kind in EventKind::ALL {
            listeners.insert(kind, Vec::new());
        }
        Self { listeners }
    }

    /// Append a listener for `kind`.
    pub fn register(&mut self, kind: EventKind, cb: EventCallback) {
        if let Some(cbs) = self.listeners.get_mut(&kind) {
            cbs.push(cb);
        }
    }

    /// Number of listeners registered for `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    /// Clone the listener list for `kind`, preserving registration order.
    ///
    /// Used to invoke listeners after internal locks have been released.
    pub fn snapshot(&self, kind: EventKind) -> Vec<EventCallback> {
        self.listeners.get(&kind).cloned().unwrap_or_default()
    }

    /// Invoke every listener registered for the event's kind, in registration
    /// order. A panicking listener does not prevent later listeners from
    /// running.
    pub fn dispatch(&self, event: &Event) {
        if let Some(cbs) = self.listeners.get(&event.kind()) {
            deliver(cbs, event);
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("EventDispatcher");
        for kind in EventKind::ALL {
            s.field(&format!("{kind:?}"), &self.listener_count(kind));
        }
        s.finish()
    }
}

/// Invoke `callbacks` in order, isolating each from the others' panics.
pub(crate) fn deliver(callbacks: &[EventCallback], event: &Event) {
    for cb in callbacks {
        if catch_unwind(AssertUnwindSafe(|| cb(event))).is_err() {
            tracing::warn!(kind = ?event.kind(), "event listener panicked");
        }
    }
}
