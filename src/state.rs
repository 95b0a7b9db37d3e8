//! Connection state management.

use std::time::Instant;

/// Connection state.
///
/// Transitions are driven exclusively by `connect()`, `disconnect()`, the
/// transport open event, and the transport close/error events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected. Also the state after a manual `disconnect()`.
    Disconnected,
    /// A connection attempt is in flight.
    Connecting,
    /// Connected and ready.
    Open,
    /// The transport closed or failed; recovery may be in progress.
    Closed,
}

impl ConnectionState {
    /// Check if the connection is usable.
    pub fn is_open(&self) -> bool {
        *self == ConnectionState::Open
    }

    /// Check if a connection attempt is in progress.
    pub fn is_connecting(&self) -> bool {
        *self == ConnectionState::Connecting
    }

    /// Check if the connection is open or in the process of opening.
    pub fn is_active(&self) -> bool {
        matches!(self, ConnectionState::Open | ConnectionState::Connecting)
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        ConnectionState::Disconnected
    }
}

/// Connection statistics.
#[derive(Debug, Clone, Default)]
pub struct ConnectionStats {
    /// Number of successful opens.
    pub connect_count: u64,
    /// Number of reconnection attempts.
    pub reconnect_count: u64,
    /// Number of messages sent.
    pub messages_sent: u64,
    /// Number of messages received.
    pub messages_received: u64,
    /// Time of last successful open.
    pub last_connected: Option<Instant>,
    /// Time of last close.
    pub last_disconnected: Option<Instant>,
}

impl ConnectionStats {
    /// Record a successful open.
    pub fn record_connect(&mut self) {
        self.connect_count += 1;
        self.last_connected = Some(Instant::now());
    }

    /// Record a close.
    pub fn record_disconnect(&mut self) {
        self.last_disconnected = Some(Instant::now());
    }

    /// Record a reconnection attempt.
    pub fn record_reconnect(&mut self) {
        self.reconnect_count += 1;
    }

    /// Record a sent message.
    pub fn record_send(&mut self) {
        self.messages_sent += 1;
    }

    /// Record a received message.
    pub fn record_receive(&mut self) {
        self.messages_received += 1;
    }

    /// Get uptime if the connection has ever opened.
    pub fn uptime(&self) -> Option<std::time::Duration> {
        self.last_connected.map(|t| t.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state() {
        assert!(ConnectionState::Open.is_open());
        assert!(!ConnectionState::Disconnected.is_open());
        assert!(ConnectionState::Connecting.is_connecting());
        assert!(ConnectionState::Open.is_active());
        assert!(ConnectionState::Connecting.is_active());
        assert!(!ConnectionState::Closed.is_active());
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_connection_stats() {
        let mut stats = ConnectionStats::default();

        stats.record_connect();
        assert_eq!(stats.connect_count, 1);
        assert!(stats.last_connected.is_some());

        stats.record_send();
        stats.record_receive();
        assert_eq!(stats.messages_sent, 1);
        assert_eq!(stats.messages_received, 1);

        stats.record_reconnect();
        assert_eq!(stats.reconnect_count, 1);

        stats.record_disconnect();
        assert!(stats.last_disconnected.is_some());
    }
}
