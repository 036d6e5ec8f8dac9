//! Shared test utilities and constants.

#![allow(dead_code)]

use std::time::Duration;

use bfxchart::chart::{CandleSeries, ChartSink, SinkError};
use bfxchart::config::HeartbeatConfig;
use bfxchart::models::{Candle, SubscriptionParams};
use bfxchart::storage::{MemoryStore, PreferenceStore};
use bfxchart::websocket::{Connection, ConnectionEvent, ManualScheduler, Transport};
use bfxchart::{ChartError, Result};

/// Bitfinex WebSocket v2 public endpoint URL.
pub const BITFINEX_WS_URL: &str = "wss://api-pub.bitfinex.com/ws/2";

/// Transport double that records what the connection does to it.
#[derive(Debug, Default)]
pub struct MockTransport {
    pub sent: Vec<String>,
    pub open: bool,
    pub close_calls: usize,
}

impl MockTransport {
    /// Parsed copies of every frame sent so far.
    pub fn sent_json(&self) -> Vec<serde_json::Value> {
        self.sent
            .iter()
            .map(|s| serde_json::from_str(s).expect("sent frame is not JSON"))
            .collect()
    }

    /// Number of sent frames whose `event` field equals `event`.
    pub fn count_event(&self, event: &str) -> usize {
        self.sent_json()
            .iter()
            .filter(|v| v["event"] == event)
            .count()
    }
}

impl Transport for MockTransport {
    fn send(&mut self, frame: String) -> Result<()> {
        if !self.open {
            return Err(ChartError::Transport("mock transport is not open".to_string()));
        }
        self.sent.push(frame);
        Ok(())
    }

    fn close(&mut self) {
        self.close_calls += 1;
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

/// Chart sink that keeps a log of the calls it received.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub series: CandleSeries,
    pub set_data_calls: Vec<Vec<Candle>>,
    pub accepted_updates: Vec<Candle>,
    pub rejected_updates: Vec<Candle>,
}

impl ChartSink for RecordingSink {
    fn set_data(&mut self, candles: Vec<Candle>) -> std::result::Result<(), SinkError> {
        self.set_data_calls.push(candles.clone());
        self.series.set_data(candles)
    }

    fn update(&mut self, candle: Candle) -> std::result::Result<(), SinkError> {
        let result = self.series.update(candle);
        match result {
            Ok(()) => self.accepted_updates.push(candle),
            Err(_) => self.rejected_updates.push(candle),
        }
        result
    }

    fn candle_at(&self, time: i64) -> Option<&Candle> {
        self.series.candle_at(time)
    }
}

pub type TestConnection = Connection<MockTransport, RecordingSink, ManualScheduler>;

/// A connection in `Connecting`, backed by `store`.
pub fn connecting(params: SubscriptionParams, store: MemoryStore) -> TestConnection {
    Connection::new(
        params,
        MockTransport::default(),
        RecordingSink::default(),
        ManualScheduler::new(),
        Box::new(store) as Box<dyn PreferenceStore>,
        HeartbeatConfig::default(),
    )
}

/// A default-parameter connection that has seen its transport open.
pub fn opened() -> TestConnection {
    let mut connection = connecting(SubscriptionParams::default(), MemoryStore::new());
    open(&mut connection);
    connection
}

/// Simulates the transport finishing its handshake.
pub fn open(connection: &mut TestConnection) {
    connection.transport_mut().open = true;
    connection.dispatch(ConnectionEvent::Opened);
}

/// Wraps a JSON string as an inbound frame event.
pub fn frame(json: &str) -> ConnectionEvent {
    ConnectionEvent::Frame(json.to_string())
}

/// Fires every timer due up to `until` on the connection's virtual clock.
pub fn advance_to(connection: &mut TestConnection, until: Duration) {
    while let Some(fired) = connection.scheduler_mut().fire_next(until) {
        connection.dispatch(ConnectionEvent::Timer(fired));
    }
}

/// Three ticks of a `1m` series, deliberately out of order.
pub const UNORDERED_SNAPSHOT: &str = r#"[17,[
    [1700000120000,102.0,103.0,104.0,101.0],
    [1700000000000,100.0,101.0,102.0,99.0],
    [1700000060000,101.0,102.0,103.0,100.0]
]]"#;
