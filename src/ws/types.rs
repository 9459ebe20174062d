//! WebSocket types and configuration

use std::time::Duration;
use thiserror::Error;

/// WebSocket connection configuration
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// WebSocket URL to connect to
    pub url: String,
    /// Payload sent once immediately after the connection opens,
    /// e.g. a quote subscription message
    pub subscribe_payload: Option<String>,
    /// Interval for sending ping frames
    pub ping_interval: Duration,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            subscribe_payload: None,
            ping_interval: Duration::from_secs(30),
        }
    }
}

impl WsConfig {
    /// Create a new config with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the payload sent when the connection opens
    pub fn subscribe_payload(mut self, payload: impl Into<String>) -> Self {
        self.subscribe_payload = Some(payload.into());
        self
    }

    /// Set ping interval
    pub fn ping_interval(mut self, d: Duration) -> Self {
        self.ping_interval = d;
        self
    }
}

/// WebSocket message types
#[derive(Debug, Clone)]
pub enum WsMessage {
    /// Text frame
    Text(String),
    /// Binary frame
    Binary(Vec<u8>),
    /// Connection established
    Connected,
    /// Connection closed; no further messages will arrive
    Disconnected,
}

/// WebSocket errors
#[derive(Debug, Clone, Error)]
pub enum WsError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("send failed: {0}")]
    SendFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_config_default() {
        let config = WsConfig::default();
        assert!(config.subscribe_payload.is_none());
        assert_eq!(config.ping_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_ws_config_builder() {
        let config = WsConfig::new("wss://example.com")
            .subscribe_payload(r#"{"symbols":["RELIANCE"],"mode":"ltp"}"#)
            .ping_interval(Duration::from_secs(15));

        assert_eq!(config.url, "wss://example.com");
        assert!(config.subscribe_payload.unwrap().contains("RELIANCE"));
        assert_eq!(config.ping_interval, Duration::from_secs(15));
    }

    #[test]
    fn test_ws_error_display() {
        let err = WsError::ConnectionFailed("timeout".to_string());
        assert_eq!(err.to_string(), "connection failed: timeout");
    }

    #[test]
    fn test_ws_message_variants() {
        let msg = WsMessage::Text("hello".to_string());
        assert!(matches!(msg, WsMessage::Text(_)));

        let msg = WsMessage::Disconnected;
        assert!(matches!(msg, WsMessage::Disconnected));
    }
}
