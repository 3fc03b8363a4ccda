use serde_json::Value;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use super::transport::{ConnectOptions, PushClient, TransportEvent};
use super::RelayError;
use crate::output::console;

/// Push client that plays back recorded transport events.
///
/// Each non-empty line of the recording is one JSON `TransportEvent`; lines
/// starting with `#` are comments. Outbound messages are kept for inspection.
#[derive(Clone, Debug, Default)]
pub struct ReplayClient {
    events: Vec<TransportEvent>,
    emitted: Vec<(String, Value)>,
    reconnects: u32,
}

impl ReplayClient {
    pub fn new(events: Vec<TransportEvent>) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    pub async fn from_path(path: &str) -> Result<Self, RelayError> {
        let handle = File::open(path)
            .await
            .map_err(|source| RelayError::ReplayRead {
                path: path.to_string(),
                source,
            })?;
        let mut lines = BufReader::new(handle).lines();
        let mut events = Vec::new();
        let mut number = 0;
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|source| RelayError::ReplayRead {
                path: path.to_string(),
                source,
            })?
        {
            number += 1;
            if let Some(event) = parse_line(&line, number)? {
                events.push(event);
            }
        }
        Ok(Self::new(events))
    }

    pub fn emitted(&self) -> &[(String, Value)] {
        &self.emitted
    }

    pub fn reconnects(&self) -> u32 {
        self.reconnects
    }
}

fn parse_line(line: &str, number: usize) -> Result<Option<TransportEvent>, RelayError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|source| RelayError::ReplayParse {
            line: number,
            source,
        })
}

pub fn parse_recording(input: &str) -> Result<Vec<TransportEvent>, RelayError> {
    let mut out = Vec::new();
    for (i, line) in input.lines().enumerate() {
        if let Some(event) = parse_line(line, i + 1)? {
            out.push(event);
        }
    }
    Ok(out)
}

impl PushClient for ReplayClient {
    fn open(
        &mut self,
        _options: &ConnectOptions,
    ) -> Result<mpsc::UnboundedReceiver<TransportEvent>, RelayError> {
        let (tx, rx) = mpsc::unbounded_channel();
        for event in self.events.drain(..) {
            tx.send(event).map_err(|e| RelayError::Open {
                message: e.to_string(),
            })?;
        }
        Ok(rx)
    }

    fn reconnect(&mut self) -> Result<(), RelayError> {
        self.reconnects += 1;
        console::debug("replay: reconnect requested");
        Ok(())
    }

    fn emit(&mut self, event: &str, payload: Value) -> Result<(), RelayError> {
        console::debug(&format!("replay: emit {event} {payload}"));
        self.emitted.push((event.to_string(), payload));
        Ok(())
    }
}
