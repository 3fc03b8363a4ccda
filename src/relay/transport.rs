use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use super::RelayError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Polling,
    Websocket,
}

/// Connection settings handed to the push client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectOptions {
    pub reconnection: bool,
    pub reconnection_delay: Duration,
    pub reconnection_delay_max: Duration,
    pub reconnection_attempts: u32,
    pub timeout: Duration,
    pub transports: Vec<Transport>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            reconnection: true,
            reconnection_delay: Duration::from_millis(1000),
            reconnection_delay_max: Duration::from_millis(5000),
            reconnection_attempts: 5,
            timeout: Duration::from_millis(20000),
            transports: vec![Transport::Polling, Transport::Websocket],
        }
    }
}

/// Everything the push client reports: lifecycle changes and server messages.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransportEvent {
    Connect,
    Disconnect {
        reason: String,
    },
    ConnectError {
        message: String,
    },
    Reconnect {
        attempt: u32,
    },
    ReconnectAttempt {
        attempt: u32,
    },
    ReconnectError {
        message: String,
    },
    ReconnectFailed,
    Message {
        event: String,
        #[serde(default)]
        payload: Value,
    },
}

/// Disconnect reason used when the server closed the connection itself.
pub const SERVER_DISCONNECT: &str = "io server disconnect";

/// Bidirectional messaging client the relay is built on.
pub trait PushClient {
    /// Opens the shared connection and returns the stream of transport events.
    fn open(&mut self, options: &ConnectOptions)
        -> Result<mpsc::UnboundedReceiver<TransportEvent>, RelayError>;

    /// Asks an open client to connect again after a server-side disconnect.
    fn reconnect(&mut self) -> Result<(), RelayError>;

    fn emit(&mut self, event: &str, payload: Value) -> Result<(), RelayError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_options_match_the_server_setup() {
        let o = ConnectOptions::default();
        assert!(o.reconnection);
        assert_eq!(o.reconnection_attempts, 5);
        assert_eq!(o.reconnection_delay_max, Duration::from_secs(5));
        assert_eq!(o.transports, vec![Transport::Polling, Transport::Websocket]);
    }

    #[test]
    fn transport_events_parse_from_json() {
        let e: TransportEvent =
            serde_json::from_str(r#"{"type":"message","event":"new_order","payload":{"id":7}}"#)
                .unwrap();
        assert_eq!(
            e,
            TransportEvent::Message {
                event: "new_order".to_string(),
                payload: json!({"id": 7}),
            }
        );
        let e: TransportEvent =
            serde_json::from_str(r#"{"type":"disconnect","reason":"io server disconnect"}"#)
                .unwrap();
        assert_eq!(
            e,
            TransportEvent::Disconnect {
                reason: SERVER_DISCONNECT.to_string()
            }
        );
        let e: TransportEvent = serde_json::from_str(r#"{"type":"connect"}"#).unwrap();
        assert_eq!(e, TransportEvent::Connect);
    }
}
