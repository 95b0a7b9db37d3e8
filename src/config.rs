//! Manager configuration types.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Result, SocketError};
use crate::event::{Event, EventCallback};
use crate::transport::BinaryType;

/// Callback invoked when the liveness ack-wait timer expires.
pub type LivenessCallback = Arc<dyn Fn() + Send + Sync>;

/// Connection manager configuration. Immutable once the manager is built.
#[derive(Clone)]
pub struct ManagerConfig {
    /// Base address; `http`/`https` schemes are rewritten to `ws`/`wss`.
    pub base_url: String,
    /// Path segment appended to the base address.
    pub namespace: String,
    /// How the transport surfaces binary frames.
    pub binary_type: Option<BinaryType>,
    /// Enable liveness probing.
    pub need_heart_check: bool,
    /// Delay before each liveness probe is sent.
    pub heart_check_timeout: Duration,
    /// How long to wait for the ack before forcing a close.
    pub server_timeout: Duration,
    /// Enable automatic reconnection after an unexpected close.
    pub is_reconnect: bool,
    /// Delay between reconnection attempts.
    pub reconnect_time: Duration,
    /// Invoked when the liveness ack-wait timer expires.
    pub heart_check_cb: Option<LivenessCallback>,
    /// Initial open listener.
    pub on_open: Option<EventCallback>,
    /// Initial close listener.
    pub on_close: Option<EventCallback>,
    /// Initial error listener.
    pub on_error: Option<EventCallback>,
    /// Initial message listener.
    pub on_message: Option<EventCallback>,
}

impl ManagerConfig {
    /// Create a configuration for the given base address with defaults:
    /// reconnection every 10 s, liveness probing disabled.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            namespace: String::new(),
            binary_type: None,
            need_heart_check: false,
            heart_check_timeout: Duration::from_secs(8),
            server_timeout: Duration::from_secs(60),
            is_reconnect: true,
            reconnect_time: Duration::from_secs(10),
            heart_check_cb: None,
            on_open: None,
            on_close: None,
            on_error: None,
            on_message: None,
        }
    }

    /// Set the namespace appended to the base address.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set how binary frames are surfaced.
    pub fn with_binary_type(mut self, binary_type: BinaryType) -> Self {
        self.binary_type = Some(binary_type);
        self
    }

    /// Enable or disable liveness probing.
    pub fn with_heart_check(mut self, enabled: bool) -> Self {
        self.need_heart_check = enabled;
        self
    }

    /// Set the delay before each liveness probe.
    pub fn with_heart_check_timeout(mut self, timeout: Duration) -> Self {
        self.heart_check_timeout = timeout;
        self
    }

    /// Set how long to wait for the liveness ack.
    pub fn with_server_timeout(mut self, timeout: Duration) -> Self {
        self.server_timeout = timeout;
        self
    }

    /// Enable or disable automatic reconnection.
    pub fn with_reconnect(mut self, enabled: bool) -> Self {
        self.is_reconnect = enabled;
        self
    }

    /// Set the delay between reconnection attempts.
    pub fn with_reconnect_time(mut self, interval: Duration) -> Self {
        self.reconnect_time = interval;
        self
    }

    /// Set the liveness-failure callback.
    pub fn with_heart_check_cb(mut self, cb: impl Fn() + Send + Sync + 'static) -> Self {
        self.heart_check_cb = Some(Arc::new(cb));
        self
    }

    /// Seed an open listener.
    pub fn with_on_open(mut self, cb: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        self.on_open = Some(Arc::new(cb));
        self
    }

    /// Seed a close listener.
    pub fn with_on_close(mut self, cb: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        self.on_close = Some(Arc::new(cb));
        self
    }

    /// Seed an error listener.
    pub fn with_on_error(mut self, cb: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(cb));
        self
    }

    /// Seed a message listener.
    pub fn with_on_message(mut self, cb: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        self.on_message = Some(Arc::new(cb));
        self
    }

    /// Derive the socket-capable target URL for `namespace`.
    ///
    /// `http` and `https` bases are rewritten to `ws` and `wss`; `ws` and
    /// `wss` bases pass through unchanged.
    pub fn target_url(&self, namespace: &str) -> Result<String> {
        let base = &self.base_url;
        let rewritten = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else if base.starts_with("wss://") || base.starts_with("ws://") {
            base.clone()
        } else {
            return Err(SocketError::invalid_url(base));
        };
        Ok(format!("{rewritten}{namespace}"))
    }
}

impl fmt::Debug for ManagerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerConfig")
            .field("base_url", &self.base_url)
            .field("namespace", &self.namespace)
            .field("binary_type", &self.binary_type)
            .field("need_heart_check", &self.need_heart_check)
            .field("heart_check_timeout", &self.heart_check_timeout)
            .field("server_timeout", &self.server_timeout)
            .field("is_reconnect", &self.is_reconnect)
            .field("reconnect_time", &self.reconnect_time)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ManagerConfig::new("http://example.com");
        assert!(!config.need_heart_check);
        assert_eq!(config.heart_check_timeout, Duration::from_secs(8));
        assert_eq!(config.server_timeout, Duration::from_secs(60));
        assert!(config.is_reconnect);
        assert_eq!(config.reconnect_time, Duration::from_secs(10));
        assert!(config.binary_type.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = ManagerConfig::new("http://example.com")
            .with_namespace("/chat")
            .with_heart_check(true)
            .with_heart_check_timeout(Duration::from_secs(5))
            .with_reconnect(false);

        assert_eq!(config.namespace, "/chat");
        assert!(config.need_heart_check);
        assert_eq!(config.heart_check_timeout, Duration::from_secs(5));
        assert!(!config.is_reconnect);
    }

    #[test]
    fn test_target_url_rewrites_scheme() {
        let config = ManagerConfig::new("http://example.com:5000/base");
        assert_eq!(
            config.target_url("/ns").unwrap(),
            "ws://example.com:5000/base/ns"
        );

        let config = ManagerConfig::new("https://example.com");
        assert_eq!(config.target_url("/ns").unwrap(), "wss://example.com/ns");
    }

    #[test]
    fn test_target_url_accepts_socket_schemes() {
        let config = ManagerConfig::new("ws://example.com");
        assert_eq!(config.target_url("").unwrap(), "ws://example.com");

        let config = ManagerConfig::new("wss://example.com");
        assert_eq!(config.target_url("/a").unwrap(), "wss://example.com/a");
    }

    #[test]
    fn test_target_url_rejects_unknown_scheme() {
        let config = ManagerConfig::new("ftp://example.com");
        assert!(matches!(
            config.target_url(""),
            Err(SocketError::InvalidUrl(_))
        ));
    }
}
