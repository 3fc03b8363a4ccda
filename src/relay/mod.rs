pub mod replay;
pub mod transport;

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::output::console;
use transport::{ConnectOptions, PushClient, TransportEvent, SERVER_DISCONNECT};

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to open push channel: {message}")]
    Open { message: String },

    #[error("failed to read replay file: {path}: {source}")]
    ReplayRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid replay line {line}: {source}")]
    ReplayParse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Server messages that are forwarded to page scripts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PageEventKind {
    #[serde(rename = "orderUpdated")]
    OrderUpdated,
    #[serde(rename = "productUpdated")]
    ProductUpdated,
    #[serde(rename = "productStatusChanged")]
    ProductStatusChanged,
    #[serde(rename = "newOrder")]
    NewOrder,
}

impl PageEventKind {
    pub const ALL: [PageEventKind; 4] = [
        Self::OrderUpdated,
        Self::ProductUpdated,
        Self::ProductStatusChanged,
        Self::NewOrder,
    ];

    /// Message name used on the push channel.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::OrderUpdated => "order_updated",
            Self::ProductUpdated => "product_updated",
            Self::ProductStatusChanged => "product_status_changed",
            Self::NewOrder => "new_order",
        }
    }

    /// Event name page scripts listen for.
    pub fn page_name(self) -> &'static str {
        match self {
            Self::OrderUpdated => "orderUpdated",
            Self::ProductUpdated => "productUpdated",
            Self::ProductStatusChanged => "productStatusChanged",
            Self::NewOrder => "newOrder",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.wire_name() == name)
    }

    fn label(self) -> &'static str {
        match self {
            Self::OrderUpdated => "Order updated",
            Self::ProductUpdated => "Product updated",
            Self::ProductStatusChanged => "Product status changed",
            Self::NewOrder => "New order",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageEvent {
    #[serde(rename = "type")]
    pub kind: PageEventKind,
    pub detail: Value,
}

/// Bridges one push-channel connection to page events.
///
/// Owns the connection handle and the reconnect counter; connection errors are
/// logged and counted, never returned.
pub struct RealtimeEventRelay<C> {
    client: C,
    options: ConnectOptions,
    connected: bool,
    reconnect_attempts: u32,
    subscribers: Vec<mpsc::UnboundedSender<PageEvent>>,
}

impl<C: PushClient> RealtimeEventRelay<C> {
    pub fn new(client: C, options: ConnectOptions) -> Self {
        Self {
            client,
            options,
            connected: false,
            reconnect_attempts: 0,
            subscribers: Vec::new(),
        }
    }

    /// Every subscriber receives every page event, in order. Dropping the
    /// receiver unsubscribes; the stream ends when the relay is dropped.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<PageEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts
    }

    pub fn has_connection(&self) -> bool {
        self.connected
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Opens the shared connection. Call once, at page load.
    pub fn start(&mut self) -> Result<mpsc::UnboundedReceiver<TransportEvent>, RelayError> {
        let events = self.client.open(&self.options)?;
        self.connected = true;
        Ok(events)
    }

    /// Processes transport events until the client closes the stream.
    pub async fn run(&mut self, mut events: mpsc::UnboundedReceiver<TransportEvent>) {
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        console::debug("push channel closed");
    }

    pub fn handle(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Connect => {
                console::info("push channel connected");
                self.reconnect_attempts = 0;
            }
            TransportEvent::Disconnect { reason } => {
                console::info(&format!("push channel disconnected: {reason}"));
                if reason == SERVER_DISCONNECT {
                    if let Err(e) = self.client.reconnect() {
                        console::warn(&format!("push channel reconnect failed: {e}"));
                    }
                }
            }
            TransportEvent::ConnectError { message } => {
                self.reconnect_attempts += 1;
                console::warn(&format!("push channel connection error: {message}"));
                if self.reconnect_attempts >= self.options.reconnection_attempts {
                    console::error("push channel max reconnection attempts reached");
                }
            }
            TransportEvent::Reconnect { attempt } => {
                console::info(&format!("push channel reconnected after {attempt} attempts"));
                self.reconnect_attempts = 0;
            }
            TransportEvent::ReconnectAttempt { attempt } => {
                console::debug(&format!("push channel reconnection attempt: {attempt}"));
            }
            TransportEvent::ReconnectError { message } => {
                console::warn(&format!("push channel reconnection error: {message}"));
            }
            TransportEvent::ReconnectFailed => {
                console::error("push channel reconnection failed");
            }
            TransportEvent::Message { event, payload } => self.dispatch(&event, payload),
        }
    }

    fn dispatch(&mut self, event: &str, payload: Value) {
        if let Some(kind) = PageEventKind::from_wire(event) {
            console::debug(&format!("{}: {payload}", kind.label()));
            let event = PageEvent {
                kind,
                detail: payload,
            };
            self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
            return;
        }
        match event {
            "connected" => console::info(&format!("connected: {payload}")),
            "error" => console::error(&format!("push channel error: {payload}")),
            other => console::debug(&format!("ignoring push message '{other}'")),
        }
    }

    pub fn join_shop(&mut self, shop_id: &Value) -> Result<(), RelayError> {
        self.emit_scoped("join_shop", shop_id)
    }

    pub fn leave_shop(&mut self, shop_id: &Value) -> Result<(), RelayError> {
        self.emit_scoped("leave_shop", shop_id)
    }

    /// No-op until [`start`](Self::start) has opened the connection.
    fn emit_scoped(&mut self, event: &str, shop_id: &Value) -> Result<(), RelayError> {
        if !self.connected {
            return Ok(());
        }
        self.client.emit(event, json!({ "shop_id": shop_id }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct FakeClient {
        sender: Option<mpsc::UnboundedSender<TransportEvent>>,
        emitted: Arc<Mutex<Vec<(String, Value)>>>,
        reconnects: Arc<Mutex<u32>>,
    }

    impl PushClient for FakeClient {
        fn open(
            &mut self,
            _options: &ConnectOptions,
        ) -> Result<mpsc::UnboundedReceiver<TransportEvent>, RelayError> {
            let (tx, rx) = mpsc::unbounded_channel();
            self.sender = Some(tx);
            Ok(rx)
        }

        fn reconnect(&mut self) -> Result<(), RelayError> {
            *self.reconnects.lock().unwrap() += 1;
            Ok(())
        }

        fn emit(&mut self, event: &str, payload: Value) -> Result<(), RelayError> {
            self.emitted
                .lock()
                .unwrap()
                .push((event.to_string(), payload));
            Ok(())
        }
    }

    fn message(event: &str, payload: Value) -> TransportEvent {
        TransportEvent::Message {
            event: event.to_string(),
            payload,
        }
    }

    #[tokio::test]
    async fn each_server_message_becomes_one_page_event() {
        let mut relay = RealtimeEventRelay::new(FakeClient::default(), ConnectOptions::default());
        let mut page = relay.subscribe();
        let events = relay.start().unwrap();
        let tx = relay.client().sender.clone().unwrap();

        for (i, kind) in PageEventKind::ALL.into_iter().enumerate() {
            tx.send(message(kind.wire_name(), json!({"id": i, "nested": {"ok": true}})))
                .unwrap();
        }
        tx.send(message("unknown_event", json!(1))).unwrap();
        drop(tx);
        relay.client.sender = None;
        relay.run(events).await;

        for (i, kind) in PageEventKind::ALL.into_iter().enumerate() {
            let got = page.recv().await.unwrap();
            assert_eq!(got.kind, kind);
            assert_eq!(got.detail, json!({"id": i, "nested": {"ok": true}}));
        }
        assert!(page.try_recv().is_err());
    }

    #[tokio::test]
    async fn long_sessions_deliver_every_event_to_every_subscriber() {
        let mut relay = RealtimeEventRelay::new(FakeClient::default(), ConnectOptions::default());
        let mut first = relay.subscribe();
        let mut second = relay.subscribe();
        let dropped = relay.subscribe();
        drop(dropped);
        let events = relay.start().unwrap();
        let tx = relay.client.sender.take().unwrap();

        for i in 0..200 {
            tx.send(message("new_order", json!({"order_id": i}))).unwrap();
        }
        drop(tx);
        relay.run(events).await;
        drop(relay);

        for page in [&mut first, &mut second] {
            let mut got = Vec::new();
            while let Some(event) = page.recv().await {
                assert_eq!(event.kind, PageEventKind::NewOrder);
                got.push(event.detail["order_id"].as_u64().unwrap());
            }
            assert_eq!(got, (0..200).collect::<Vec<u64>>());
        }
    }

    #[test]
    fn page_event_serializes_with_page_name() {
        let e = PageEvent {
            kind: PageEventKind::ProductStatusChanged,
            detail: json!({"id": 3}),
        };
        assert_eq!(
            serde_json::to_value(&e).unwrap(),
            json!({"type": "productStatusChanged", "detail": {"id": 3}})
        );
        for kind in PageEventKind::ALL {
            assert_eq!(serde_json::to_value(kind).unwrap(), json!(kind.page_name()));
        }
    }

    #[test]
    fn counter_tracks_errors_and_resets_on_connect() {
        let mut relay = RealtimeEventRelay::new(FakeClient::default(), ConnectOptions::default());
        for _ in 0..7 {
            relay.handle(TransportEvent::ConnectError {
                message: "timeout".to_string(),
            });
        }
        assert_eq!(relay.reconnect_attempts(), 7);
        relay.handle(TransportEvent::Connect);
        assert_eq!(relay.reconnect_attempts(), 0);
        relay.handle(TransportEvent::ConnectError {
            message: "timeout".to_string(),
        });
        relay.handle(TransportEvent::Reconnect { attempt: 1 });
        assert_eq!(relay.reconnect_attempts(), 0);
    }

    #[test]
    fn server_disconnect_triggers_manual_reconnect() {
        let client = FakeClient::default();
        let reconnects = client.reconnects.clone();
        let mut relay = RealtimeEventRelay::new(client, ConnectOptions::default());
        relay.handle(TransportEvent::Disconnect {
            reason: "transport close".to_string(),
        });
        assert_eq!(*reconnects.lock().unwrap(), 0);
        relay.handle(TransportEvent::Disconnect {
            reason: SERVER_DISCONNECT.to_string(),
        });
        assert_eq!(*reconnects.lock().unwrap(), 1);
    }

    #[test]
    fn shop_channel_actions_need_a_connection() {
        let client = FakeClient::default();
        let emitted = client.emitted.clone();
        let mut relay = RealtimeEventRelay::new(client, ConnectOptions::default());
        relay.join_shop(&json!(12)).unwrap();
        assert!(emitted.lock().unwrap().is_empty());

        let _events = relay.start().unwrap();
        relay.join_shop(&json!(12)).unwrap();
        relay.leave_shop(&json!("12")).unwrap();
        assert_eq!(
            *emitted.lock().unwrap(),
            vec![
                ("join_shop".to_string(), json!({"shop_id": 12})),
                ("leave_shop".to_string(), json!({"shop_id": "12"})),
            ]
        );
    }
}
